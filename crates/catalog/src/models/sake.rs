//! Sake (product) model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Brewery;

/// A sake product.
///
/// NUMERIC columns (`nihonshudo`, `acid`, `alcohol`) are carried as the
/// text PostgreSQL renders for them. They are parsed into floats when a
/// response is assembled, which keeps "absent" (`None`) distinct from
/// "present but corrupt".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sake {
    pub id: i32,

    pub name: String,

    /// Owning brewery; always resolves (FK, `ON DELETE RESTRICT`).
    pub brewery_id: i32,

    /// Product provenance region. Distinct from the brewery's prefecture.
    pub region: String,

    /// Rice variety.
    pub rice: Option<String>,

    /// Polishing ratio in percent.
    pub seimaibuai: Option<i32>,

    /// Sake meter value.
    pub nihonshudo: Option<String>,

    pub acid: Option<String>,

    /// Alcohol by volume in percent.
    pub alcohol: Option<String>,

    pub description: Option<String>,

    pub image_url: Option<String>,

    pub created_at: NaiveDateTime,
}

/// A sake joined to its owning brewery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SakeWithBrewery {
    pub sake: Sake,
    pub brewery: Brewery,
}
