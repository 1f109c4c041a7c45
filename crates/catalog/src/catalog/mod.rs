//! Catalog query layer.
//!
//! Turns loosely structured search input into paginated, brewery-joined,
//! tag-enriched records:
//! - [`query_builder`] renders page and count SQL from one filter
//! - [`tags`] resolves tag labels for a page with one bulk lookup
//! - [`assemble`] normalizes rows into response records
//! - [`facets`] lists regions and tag labels
//!
//! [`CatalogService`] ties these together over a [`CatalogStore`].

pub mod assemble;
pub mod facets;
pub mod memory;
pub mod postgres;
pub mod query_builder;
pub mod seed;
pub mod service;
pub mod store;
pub mod tags;
pub mod types;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;
pub use seed::{SeedData, SeedReport, load_seed};
pub use service::CatalogService;
pub use store::{CatalogStore, SearchRows, TaggedSake};
pub use tags::{TagLookup, TagMap, resolve_tags};
pub use types::{Page, SakeDetail, SakeFilter, SakeSummary, SearchPage, SearchRequest};
