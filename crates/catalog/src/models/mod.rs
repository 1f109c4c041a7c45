//! Catalog models.

pub mod brewery;
pub mod sake;
pub mod taste_tag;

pub use brewery::Brewery;
pub use sake::{Sake, SakeWithBrewery};
pub use taste_tag::{TagLink, TasteTag};
