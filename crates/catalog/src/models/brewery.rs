//! Brewery model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A sake brewery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brewery {
    /// Natural identifier from the seed data.
    pub id: i32,

    /// Brewery name.
    pub name: String,

    /// Prefecture the brewery itself is located in.
    pub prefecture: String,

    pub address: Option<String>,

    pub url: Option<String>,

    /// When the row was seeded.
    pub created_at: NaiveDateTime,
}
