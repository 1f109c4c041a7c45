//! Catalog service: search, detail and facet operations.
//!
//! Stateless over a [`CatalogStore`]; every call is independent and keeps
//! nothing between requests.

use std::sync::Arc;

use tracing::debug;

use super::assemble::{assemble_detail, assemble_summary};
use super::facets;
use super::store::{CatalogStore, SearchRows, TaggedSake};
use super::tags::tags_of;
use super::types::{SakeDetail, SearchPage, SearchRequest};
use crate::error::{AppError, AppResult};

/// Read-only catalog query service.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Search sakes by text and region, one page at a time.
    ///
    /// `sweetness` is accepted but never narrows the result.
    pub async fn search(&self, request: &SearchRequest) -> AppResult<SearchPage> {
        if let Some(sweetness) = request.sweetness {
            debug!(sweetness = sweetness, "sweetness filter accepted but not applied");
        }

        let SearchRows {
            rows,
            total,
            mut tags,
        } = self.store.search(&request.filter, request.page).await?;

        let items: Vec<_> = rows
            .into_iter()
            .map(|r| {
                let sake_tags = tags_of(&mut tags, r.sake.id);
                assemble_summary(r.sake, &r.brewery, sake_tags)
            })
            .collect();

        debug!(
            q = ?request.filter.text,
            region = ?request.filter.region,
            page = request.page.page(),
            per_page = request.page.per_page(),
            total,
            returned = items.len(),
            "search completed"
        );

        Ok(SearchPage {
            items,
            page: request.page.page(),
            per_page: request.page.per_page(),
            total,
        })
    }

    /// Fetch one sake with its brewery and tags.
    pub async fn detail(&self, id: i32) -> AppResult<SakeDetail> {
        let TaggedSake { record, tags } = self
            .store
            .find_sake(id)
            .await?
            .ok_or(AppError::NotFound("sake not found"))?;

        assemble_detail(record.sake, &record.brewery, tags)
    }

    /// Distinct product regions, sorted.
    pub async fn regions(&self) -> AppResult<Vec<String>> {
        facets::list_regions(self.store.as_ref()).await
    }

    /// Taste tag vocabulary, sorted.
    pub async fn tag_labels(&self) -> AppResult<Vec<String>> {
        facets::list_tag_labels(self.store.as_ref()).await
    }

    /// Check if the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.store.ping().await
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::memory::MemoryCatalogStore;
    use crate::catalog::seed::SeedData;
    use crate::catalog::tags::TagMap;
    use crate::catalog::types::{Page, SakeFilter};
    use crate::models::SakeWithBrewery;

    fn seed() -> SeedData {
        SeedData::from_json(
            r#"{
                "breweries": [
                    {"id": 1, "name": "Asahi Shuzo", "prefecture": "Yamaguchi"},
                    {"id": 2, "name": "Asahi-Shuzo Niigata", "prefecture": "Niigata"}
                ],
                "taste_tags": [
                    {"id": 1, "label": "fruity"},
                    {"id": 2, "label": "dry"},
                    {"id": 3, "label": "umami"}
                ],
                "sake": [
                    {"id": 1, "name": "Dassai 23", "brewery_id": 1, "region": "Yamaguchi",
                     "nihonshudo": 4, "acid": 1.2, "alcohol": 16},
                    {"id": 2, "name": "Kubota Manju", "brewery_id": 2, "region": "Niigata",
                     "description": "Elegant and DRY"},
                    {"id": 3, "name": "Kubota Senju", "brewery_id": 2, "region": "Niigata"}
                ],
                "sake_taste_map": [
                    {"sake_id": 1, "tag_id": 1},
                    {"sake_id": 2, "tag_id": 3},
                    {"sake_id": 2, "tag_id": 2}
                ]
            }"#,
        )
        .unwrap()
    }

    fn service() -> (CatalogService, Arc<MemoryCatalogStore>) {
        let store = Arc::new(MemoryCatalogStore::from_seed(&seed()));
        (CatalogService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn search_enriches_with_tags_in_tag_id_order() {
        let (service, _) = service();
        let request = SearchRequest::new(None, None, None, 1, 20).unwrap();

        let page = service.search(&request).await.unwrap();

        assert_eq!(page.total, 3);
        let ids: Vec<i32> = page.items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(page.items[0].tags, vec!["fruity"]);
        assert_eq!(page.items[1].tags, vec!["dry", "umami"]);
        assert!(page.items[2].tags.is_empty());
        assert_eq!(page.items[1].brewery, "Asahi-Shuzo Niigata");
    }

    #[tokio::test]
    async fn sweetness_does_not_filter() {
        let (service, _) = service();
        let with = SearchRequest::new(None, None, Some(2), 1, 20).unwrap();
        let without = SearchRequest::new(None, None, None, 1, 20).unwrap();

        assert_eq!(
            service.search(&with).await.unwrap(),
            service.search(&without).await.unwrap()
        );
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let (service, store) = service();
        let request = SearchRequest::new(Some("nomatch".to_string()), None, None, 1, 20).unwrap();

        let page = service.search(&request).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        // One search call; the empty page needs no tag lookup.
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn page_tags_come_from_one_lookup() {
        let (service, store) = service();
        let request = SearchRequest::new(None, Some("Niigata".to_string()), None, 1, 20).unwrap();

        service.search(&request).await.unwrap();

        // The search itself plus a single bulk tag lookup.
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn page_past_the_end_keeps_total() {
        let (service, _) = service();
        let request = SearchRequest::new(None, None, None, 9, 2).unwrap();

        let page = service.search(&request).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 9);
        assert_eq!(page.per_page, 2);
    }

    #[tokio::test]
    async fn detail_found_and_missing() {
        let (service, _) = service();

        let detail = service.detail(1).await.unwrap();
        assert_eq!(detail.id, 1);
        assert_eq!(detail.brewery, "Asahi Shuzo");
        assert_eq!(detail.taste_tags, vec!["fruity"]);
        assert_eq!(detail.alcohol, Some(16.0));

        let err = service.detail(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("sake not found")));
    }

    #[tokio::test]
    async fn transient_store_failure_propagates() {
        let (service, store) = service();
        store.set_unavailable(true);

        let err = service.regions().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!service.store_healthy().await);
    }

    #[tokio::test]
    async fn untagged_detail_has_empty_lists() {
        let (service, _) = service();

        let detail = service.detail(3).await.unwrap();

        assert!(detail.tags.is_empty());
        assert!(detail.taste_tags.is_empty());
    }

    /// Serves one fixed snapshot and counts reads.
    struct SnapshotStore {
        record: SakeWithBrewery,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl CatalogStore for SnapshotStore {
        async fn search(&self, _filter: &SakeFilter, _page: Page) -> AppResult<SearchRows> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let mut tags = TagMap::new();
            tags.insert(self.record.sake.id, vec!["snapshot-tag".to_string()]);
            Ok(SearchRows {
                rows: vec![self.record.clone()],
                total: 1,
                tags,
            })
        }

        async fn find_sake(&self, _id: i32) -> AppResult<Option<TaggedSake>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Some(TaggedSake {
                record: self.record.clone(),
                tags: vec!["snapshot-tag".to_string()],
            }))
        }

        async fn regions(&self) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn tag_labels(&self) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn ping(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn rows_and_tags_come_from_one_store_read() {
        let seeded = MemoryCatalogStore::from_seed(&seed());
        let record = seeded.find_sake(1).await.unwrap().unwrap().record;
        let store = Arc::new(SnapshotStore {
            record,
            reads: AtomicUsize::new(0),
        });
        let service = CatalogService::new(store.clone());

        let request = SearchRequest::new(None, None, None, 1, 20).unwrap();
        let page = service.search(&request).await.unwrap();
        assert_eq!(page.items[0].tags, vec!["snapshot-tag"]);

        let detail = service.detail(1).await.unwrap();
        assert_eq!(detail.tags, vec!["snapshot-tag"]);

        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }
}
