//! Bulk tag resolution.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::TagLink;

/// Tag labels keyed by sake id.
///
/// Sakes without tags are absent; use [`tags_of`] to read with an empty default.
pub type TagMap = HashMap<i32, Vec<String>>;

/// Source of sake/tag associations.
///
/// Implemented by whatever holds the read snapshot (a PostgreSQL
/// transaction, an in-memory view) so tags are read alongside the rows
/// they decorate.
#[async_trait]
pub trait TagLookup: Send {
    /// Associations for a non-empty id set, ordered by sake id then tag id.
    async fn tag_links(&mut self, sake_ids: &[i32]) -> AppResult<Vec<TagLink>>;
}

/// Resolve tag labels for a set of sake ids with one lookup.
///
/// An empty id set returns an empty map without touching the source.
/// Duplicate ids are collapsed before the lookup.
pub async fn resolve_tags(source: &mut dyn TagLookup, sake_ids: &[i32]) -> AppResult<TagMap> {
    if sake_ids.is_empty() {
        return Ok(TagMap::new());
    }

    let mut ids = sake_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let links = source.tag_links(&ids).await?;

    let mut tags = TagMap::with_capacity(ids.len());
    for link in links {
        tags.entry(link.sake_id).or_default().push(link.label);
    }

    Ok(tags)
}

/// Take the labels for one sake out of the map, defaulting to none.
pub fn tags_of(tags: &mut TagMap, sake_id: i32) -> Vec<String> {
    tags.remove(&sake_id).unwrap_or_default()
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Records every lookup it receives.
    #[derive(Default)]
    struct RecordingLookup {
        requests: Vec<Vec<i32>>,
    }

    #[async_trait]
    impl TagLookup for RecordingLookup {
        async fn tag_links(&mut self, sake_ids: &[i32]) -> AppResult<Vec<TagLink>> {
            self.requests.push(sake_ids.to_vec());
            Ok(vec![
                TagLink {
                    sake_id: 2,
                    label: "dry".to_string(),
                },
                TagLink {
                    sake_id: 2,
                    label: "umami".to_string(),
                },
                TagLink {
                    sake_id: 5,
                    label: "fruity".to_string(),
                },
            ])
        }
    }

    #[tokio::test]
    async fn empty_ids_skip_the_lookup() {
        let mut source = RecordingLookup::default();

        let tags = resolve_tags(&mut source, &[]).await.unwrap();

        assert!(tags.is_empty());
        assert!(source.requests.is_empty());
    }

    #[tokio::test]
    async fn one_lookup_for_deduplicated_ids() {
        let mut source = RecordingLookup::default();

        let mut tags = resolve_tags(&mut source, &[5, 2, 5, 9]).await.unwrap();

        assert_eq!(source.requests, vec![vec![2, 5, 9]]);
        assert_eq!(tags_of(&mut tags, 2), vec!["dry", "umami"]);
        assert_eq!(tags_of(&mut tags, 5), vec!["fruity"]);
        assert!(tags_of(&mut tags, 9).is_empty());
    }
}
