//! In-memory catalog store.
//!
//! Holds a seeded snapshot and answers queries with the same semantics as
//! the PostgreSQL store. Used for tests and for running the API without a
//! database.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use super::seed::SeedData;
use super::store::{CatalogStore, SearchRows, TaggedSake};
use super::tags::{TagLookup, resolve_tags, tags_of};
use super::types::{Page, SakeFilter};
use crate::error::{AppError, AppResult};
use crate::models::{Brewery, Sake, SakeWithBrewery, TagLink, TasteTag};

/// Catalog store over in-process maps.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    breweries: HashMap<i32, Brewery>,
    /// Keyed by id, so iteration is already in id order.
    sakes: BTreeMap<i32, Sake>,
    tags: HashMap<i32, TasteTag>,
    /// (sake_id, tag_id) pairs, ordered.
    links: BTreeSet<(i32, i32)>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryCatalogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a seed document, skipping rows whose key already
    /// exists like the PostgreSQL seed loader does.
    pub fn from_seed(seed: &SeedData) -> Self {
        let now = Utc::now().naive_utc();
        let mut store = Self::new();

        for b in &seed.breweries {
            store.breweries.entry(b.id).or_insert_with(|| Brewery {
                id: b.id,
                name: b.name.clone(),
                prefecture: b.prefecture.clone(),
                address: b.address.clone().filter(|s| !s.is_empty()),
                url: b.url.clone().filter(|s| !s.is_empty()),
                created_at: now,
            });
        }

        for t in &seed.taste_tags {
            store.tags.entry(t.id).or_insert_with(|| TasteTag {
                id: t.id,
                label: t.label.clone(),
            });
        }

        for s in &seed.sake {
            store.sakes.entry(s.id).or_insert_with(|| Sake {
                id: s.id,
                name: s.name.clone(),
                brewery_id: s.brewery_id,
                region: s.region.clone(),
                rice: s.rice.clone().filter(|v| !v.is_empty()),
                seimaibuai: s.seimaibuai,
                nihonshudo: s.nihonshudo.map(|v| v.to_string()),
                acid: s.acid.map(|v| v.to_string()),
                alcohol: s.alcohol.map(|v| v.to_string()),
                description: s.description.clone().filter(|v| !v.is_empty()),
                image_url: s.image_url.clone().filter(|v| !v.is_empty()),
                created_at: now,
            });
        }

        for l in &seed.sake_taste_map {
            store.links.insert((l.sake_id, l.tag_id));
        }

        store
    }

    /// Insert or replace a raw sake row, bypassing seed normalization.
    pub fn with_sake(mut self, sake: Sake) -> Self {
        self.sakes.insert(sake.id, sake);
        self
    }

    /// Make every call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of store calls answered so far, tag lookups included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::TransientStore(
                "in-memory catalog marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn joined(&self, sake: &Sake) -> Option<SakeWithBrewery> {
        let brewery = self.breweries.get(&sake.brewery_id)?;
        Some(SakeWithBrewery {
            sake: sake.clone(),
            brewery: brewery.clone(),
        })
    }
}

/// Tag lookups against the store's maps. Each lookup counts as a call.
struct MemoryTags<'a>(&'a MemoryCatalogStore);

#[async_trait]
impl<'a> TagLookup for MemoryTags<'a> {
    async fn tag_links(&mut self, sake_ids: &[i32]) -> AppResult<Vec<TagLink>> {
        let store = self.0;
        store.begin_call()?;

        let wanted: BTreeSet<i32> = sake_ids.iter().copied().collect();
        let links = store
            .links
            .iter()
            .filter(|(sake_id, _)| wanted.contains(sake_id))
            .filter_map(|(sake_id, tag_id)| {
                store.tags.get(tag_id).map(|tag| TagLink {
                    sake_id: *sake_id,
                    label: tag.label.clone(),
                })
            })
            .collect();

        Ok(links)
    }
}

/// Case-insensitive substring test.
fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn matches(record: &SakeWithBrewery, filter: &SakeFilter, text_lower: Option<&str>) -> bool {
    if let Some(region) = filter.region.as_deref()
        && record.sake.region != region
    {
        return false;
    }

    match text_lower {
        None => true,
        Some(needle) => {
            contains_ci(&record.sake.name, needle)
                || contains_ci(&record.brewery.name, needle)
                || record
                    .sake
                    .description
                    .as_deref()
                    .is_some_and(|d| contains_ci(d, needle))
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn search(&self, filter: &SakeFilter, page: Page) -> AppResult<SearchRows> {
        self.begin_call()?;

        let text_lower = filter.text.as_deref().map(str::to_lowercase);

        let matching: Vec<SakeWithBrewery> = self
            .sakes
            .values()
            .filter_map(|s| self.joined(s))
            .filter(|r| matches(r, filter, text_lower.as_deref()))
            .collect();

        let total = matching.len() as i64;
        let rows: Vec<SakeWithBrewery> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        let sake_ids: Vec<i32> = rows.iter().map(|r| r.sake.id).collect();
        let tags = resolve_tags(&mut MemoryTags(self), &sake_ids).await?;

        Ok(SearchRows { rows, total, tags })
    }

    async fn find_sake(&self, id: i32) -> AppResult<Option<TaggedSake>> {
        self.begin_call()?;

        let Some(record) = self.sakes.get(&id).and_then(|s| self.joined(s)) else {
            return Ok(None);
        };

        let mut tags = resolve_tags(&mut MemoryTags(self), &[id]).await?;
        Ok(Some(TaggedSake {
            tags: tags_of(&mut tags, id),
            record,
        }))
    }

    async fn regions(&self) -> AppResult<Vec<String>> {
        self.begin_call()?;

        let regions: BTreeSet<&str> = self.sakes.values().map(|s| s.region.as_str()).collect();
        Ok(regions.into_iter().map(str::to_string).collect())
    }

    async fn tag_labels(&self) -> AppResult<Vec<String>> {
        self.begin_call()?;

        let mut labels: Vec<String> = self.tags.values().map(|t| t.label.clone()).collect();
        labels.sort();
        Ok(labels)
    }

    async fn ping(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}
