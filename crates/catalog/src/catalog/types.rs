//! Catalog request and response types.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Default page number.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest accepted page size.
pub const MAX_PER_PAGE: i64 = 50;

/// Accepted sweetness range (inclusive).
pub const SWEETNESS_RANGE: std::ops::RangeInclusive<i64> = -2..=2;

/// Search predicate shared by the page query and the count query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SakeFilter {
    /// Case-insensitive substring matched against sake name, brewery name
    /// and description.
    pub text: Option<String>,

    /// Exact, case-sensitive region.
    pub region: Option<String>,
}

impl SakeFilter {
    /// Build a filter. Empty strings mean "no filter".
    pub fn new(text: Option<String>, region: Option<String>) -> Self {
        Self {
            text: text.filter(|s| !s.is_empty()),
            region: region.filter(|s| !s.is_empty()),
        }
    }

    /// Whether the filter matches every sake.
    pub fn is_unfiltered(&self) -> bool {
        self.text.is_none() && self.region.is_none()
    }
}

/// A validated 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    per_page: u32,
}

impl Page {
    /// Validate `1 <= page <= u32::MAX` and `1 <= per_page <= 50`.
    pub fn new(page: i64, per_page: i64) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::InvalidInput(format!("page must be >= 1, got {page}")));
        }
        let page = u32::try_from(page).map_err(|_| {
            AppError::InvalidInput(format!("page must be at most {}, got {page}", u32::MAX))
        })?;

        let per_page = u32::try_from(per_page)
            .ok()
            .filter(|p| (1..=MAX_PER_PAGE as u32).contains(p))
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "per_page must be between 1 and {MAX_PER_PAGE}, got {per_page}"
                ))
            })?;

        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Rows in this page.
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE as u32,
            per_page: DEFAULT_PER_PAGE as u32,
        }
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub filter: SakeFilter,
    pub page: Page,

    /// Accepted and range-checked, but reserved: it never narrows results.
    pub sweetness: Option<i8>,
}

impl SearchRequest {
    /// Validate raw parameters into a request.
    pub fn new(
        text: Option<String>,
        region: Option<String>,
        sweetness: Option<i64>,
        page: i64,
        per_page: i64,
    ) -> AppResult<Self> {
        let sweetness = match sweetness {
            None => None,
            Some(s) if SWEETNESS_RANGE.contains(&s) => Some(s as i8),
            Some(s) => {
                return Err(AppError::InvalidInput(format!(
                    "sweetness must be between -2 and 2, got {s}"
                )));
            }
        };

        Ok(Self {
            filter: SakeFilter::new(text, region),
            page: Page::new(page, per_page)?,
            sweetness,
        })
    }
}

/// Search result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SakeSummary {
    pub id: i32,
    pub name: String,
    /// Brewery name, flattened.
    pub brewery: String,
    pub region: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

/// Full sake record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SakeDetail {
    pub id: i32,
    pub name: String,
    pub brewery: String,
    pub region: String,
    pub tags: Vec<String>,
    pub rice: Option<String>,
    pub seimaibuai: Option<i32>,
    pub nihonshudo: Option<f64>,
    pub acid: Option<f64>,
    pub alcohol: Option<f64>,
    /// Same list as `tags`, kept under a second name for existing clients.
    pub taste_tags: Vec<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<SakeSummary>,
    pub page: u32,
    pub per_page: u32,
    /// Matches across all pages.
    pub total: i64,
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn page_offsets() {
        let first = Page::new(1, 20).unwrap();
        assert_eq!(first.offset(), 0);
        assert_eq!(first.limit(), 20);

        let third = Page::new(3, 7).unwrap();
        assert_eq!(third.offset(), 14);
        assert_eq!(third.limit(), 7);
    }

    #[test]
    fn page_bounds_rejected() {
        assert!(matches!(Page::new(0, 20), Err(AppError::InvalidInput(_))));
        assert!(matches!(Page::new(-3, 20), Err(AppError::InvalidInput(_))));
        assert!(matches!(Page::new(1, 0), Err(AppError::InvalidInput(_))));
        assert!(matches!(Page::new(1, 51), Err(AppError::InvalidInput(_))));
        assert!(Page::new(1, 50).is_ok());
        assert!(Page::new(1, 1).is_ok());
    }

    #[test]
    fn oversized_page_reports_upper_bound() {
        let err = Page::new(5_000_000_000, 20).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("at most 4294967295"), "{message}");
        assert!(!message.contains(">= 1"), "{message}");

        let err = Page::new(0, 20).unwrap_err();
        assert!(err.to_string().contains(">= 1"));

        assert_eq!(Page::new(i64::from(u32::MAX), 50).unwrap().page(), u32::MAX);
    }

    #[test]
    fn default_page_matches_api_defaults() {
        let page = Page::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.per_page(), 20);
    }

    #[test]
    fn empty_strings_are_no_filter() {
        let filter = SakeFilter::new(Some(String::new()), Some(String::new()));
        assert!(filter.is_unfiltered());

        let filter = SakeFilter::new(Some("dassai".to_string()), None);
        assert_eq!(filter.text.as_deref(), Some("dassai"));
        assert!(filter.region.is_none());
    }

    #[test]
    fn sweetness_range_checked_but_kept() {
        let req = SearchRequest::new(None, None, Some(-2), 1, 20).unwrap();
        assert_eq!(req.sweetness, Some(-2));
        assert!(req.filter.is_unfiltered());

        let err = SearchRequest::new(None, None, Some(3), 1, 20).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn detail_serializes_every_field() {
        let detail = SakeDetail {
            id: 1,
            name: "Dassai 23".to_string(),
            brewery: "Asahi Shuzo".to_string(),
            region: "Yamaguchi".to_string(),
            tags: vec![],
            rice: None,
            seimaibuai: None,
            nihonshudo: None,
            acid: None,
            alcohol: None,
            taste_tags: vec![],
            description: None,
            image_url: None,
        };

        let json = serde_json::to_value(&detail).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "id",
            "name",
            "brewery",
            "region",
            "tags",
            "rice",
            "seimaibuai",
            "nihonshudo",
            "acid",
            "alcohol",
            "taste_tags",
            "description",
            "image_url",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj.len(), 13);
        assert!(json["image_url"].is_null());
        assert_eq!(json["tags"], serde_json::json!([]));
    }
}
