//! Facet lists for client filter UIs.

use super::store::CatalogStore;
use crate::error::AppResult;

/// Distinct regions present among sakes, sorted ascending.
pub async fn list_regions(store: &dyn CatalogStore) -> AppResult<Vec<String>> {
    let regions = store.regions().await?;
    Ok(sorted_unique(regions))
}

/// Every taste tag label, whether used or not, sorted ascending.
pub async fn list_tag_labels(store: &dyn CatalogStore) -> AppResult<Vec<String>> {
    let labels = store.tag_labels().await?;
    Ok(sorted_unique(labels))
}

/// Byte-wise sort and dedup, independent of the database collation.
fn sorted_unique(mut values: Vec<String>) -> Vec<String> {
    values.sort_unstable();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_unique_dedups() {
        let values = vec![
            "Niigata".to_string(),
            "Kyoto".to_string(),
            "Niigata".to_string(),
        ];
        assert_eq!(sorted_unique(values), vec!["Kyoto", "Niigata"]);
    }

    #[test]
    fn sorted_unique_is_case_sensitive() {
        let values = vec!["niigata".to_string(), "Niigata".to_string()];
        assert_eq!(sorted_unique(values), vec!["Niigata", "niigata"]);
    }
}
