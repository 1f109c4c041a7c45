//! Catalog store abstraction.
//!
//! The query layer reads the catalog only through [`CatalogStore`]. The
//! production implementation is [`PgCatalogStore`](super::PgCatalogStore);
//! tests swap in an in-memory store without changing any call sites.

use async_trait::async_trait;

use super::tags::TagMap;
use super::types::{Page, SakeFilter};
use crate::error::AppResult;
use crate::models::SakeWithBrewery;

/// One page of joined rows, the total for the same filter, and the tags of
/// the rows on the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRows {
    /// Rows for the requested page, ordered by sake id.
    pub rows: Vec<SakeWithBrewery>,

    /// Count of all rows matching the filter, ignoring pagination.
    pub total: i64,

    /// Tag labels for the page's rows.
    pub tags: TagMap,
}

/// A single sake with its brewery and tag labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSake {
    pub record: SakeWithBrewery,
    pub tags: Vec<String>,
}

/// Set-oriented, read-only access to the catalog.
///
/// `search` and `find_sake` each read one consistent snapshot: rows, total
/// and tags never mix data from different points in time.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Rows matching `filter` for `page`, the unpaginated total and the
    /// page's tags.
    async fn search(&self, filter: &SakeFilter, page: Page) -> AppResult<SearchRows>;

    /// A single sake joined to its brewery, with its tags.
    async fn find_sake(&self, id: i32) -> AppResult<Option<TaggedSake>>;

    /// Distinct regions referenced by at least one sake.
    async fn regions(&self) -> AppResult<Vec<String>>;

    /// The full taste tag vocabulary.
    async fn tag_labels(&self) -> AppResult<Vec<String>>;

    /// Check if the store is reachable.
    async fn ping(&self) -> bool;
}
