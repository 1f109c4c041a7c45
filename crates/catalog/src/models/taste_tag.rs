//! Taste tag vocabulary and sake/tag associations.

use serde::{Deserialize, Serialize};

/// A taste tag (e.g. "fruity", "dry").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TasteTag {
    pub id: i32,

    /// Unique human-readable label.
    pub label: String,
}

/// One association row resolved to its label.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TagLink {
    pub sake_id: i32,
    pub label: String,
}
