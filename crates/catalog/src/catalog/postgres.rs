//! PostgreSQL catalog store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

use super::query_builder::{self, SakeQueryBuilder};
use super::store::{CatalogStore, SearchRows, TaggedSake};
use super::tags::{TagLookup, resolve_tags, tags_of};
use super::types::{Page, SakeFilter};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{Brewery, Sake, SakeWithBrewery, TagLink};

/// Catalog store backed by a PostgreSQL pool.
///
/// Every call borrows a pooled connection (or opens a transaction) for its
/// own duration only, and is bounded by `query_timeout`.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgCatalogStore {
    /// Create a new store.
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open a read-only REPEATABLE READ transaction bounded by the
    /// configured statement timeout.
    async fn snapshot(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = {}",
            self.query_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        Ok(tx)
    }

    /// Run a store operation under the configured timeout.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::TransientStore(format!(
                "{operation} timed out after {}ms",
                self.query_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn search(&self, filter: &SakeFilter, page: Page) -> AppResult<SearchRows> {
        let builder = SakeQueryBuilder::new(filter.clone());
        let count_sql = builder.build_count();
        let page_sql = builder.build(page);

        self.bounded("search", async move {
            // Count, page and tags share one snapshot so the total and the
            // tags always agree with the rows.
            let mut tx = self.snapshot().await?;

            let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&mut *tx).await?;

            let rows = sqlx::query_as::<_, SakeRow>(&page_sql)
                .fetch_all(&mut *tx)
                .await?;

            let sake_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
            let tags = resolve_tags(&mut *tx, &sake_ids).await?;

            tx.commit().await?;

            debug!(total = %total, returned = %rows.len(), "search rows fetched");

            Ok(SearchRows {
                rows: rows.into_iter().map(SakeWithBrewery::from).collect(),
                total,
                tags,
            })
        })
        .await
    }

    async fn find_sake(&self, id: i32) -> AppResult<Option<TaggedSake>> {
        let sql = query_builder::build_detail(id);

        self.bounded("find_sake", async move {
            let mut tx = self.snapshot().await?;

            let Some(row) = sqlx::query_as::<_, SakeRow>(&sql)
                .fetch_optional(&mut *tx)
                .await?
            else {
                tx.commit().await?;
                return Ok(None);
            };

            let mut tags = resolve_tags(&mut *tx, &[row.id]).await?;
            let sake_tags = tags_of(&mut tags, row.id);

            tx.commit().await?;

            Ok(Some(TaggedSake {
                record: SakeWithBrewery::from(row),
                tags: sake_tags,
            }))
        })
        .await
    }

    async fn regions(&self) -> AppResult<Vec<String>> {
        let sql = query_builder::build_regions();

        self.bounded("regions", async move {
            let regions: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
            Ok(regions)
        })
        .await
    }

    async fn tag_labels(&self) -> AppResult<Vec<String>> {
        let sql = query_builder::build_tag_labels();

        self.bounded("tag_labels", async move {
            let labels: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
            Ok(labels)
        })
        .await
    }

    async fn ping(&self) -> bool {
        self.bounded("ping", async { Ok(db::check_health(&self.pool).await) })
            .await
            .unwrap_or(false)
    }
}

/// Tag lookups on a connection, typically the one holding a snapshot.
#[async_trait]
impl TagLookup for PgConnection {
    async fn tag_links(&mut self, sake_ids: &[i32]) -> AppResult<Vec<TagLink>> {
        let Some(sql) = query_builder::build_tags(sake_ids) else {
            return Ok(Vec::new());
        };

        let links = sqlx::query_as::<_, TagLink>(&sql)
            .fetch_all(&mut *self)
            .await?;

        Ok(links)
    }
}

impl std::fmt::Debug for PgCatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCatalogStore")
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

/// Internal row type for a sake joined to its brewery.
#[derive(sqlx::FromRow)]
struct SakeRow {
    id: i32,
    name: String,
    brewery_id: i32,
    region: String,
    rice: Option<String>,
    seimaibuai: Option<i32>,
    nihonshudo: Option<String>,
    acid: Option<String>,
    alcohol: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    created_at: NaiveDateTime,
    brewery_name: String,
    brewery_prefecture: String,
    brewery_address: Option<String>,
    brewery_url: Option<String>,
    brewery_created_at: NaiveDateTime,
}

impl From<SakeRow> for SakeWithBrewery {
    fn from(row: SakeRow) -> Self {
        Self {
            brewery: Brewery {
                id: row.brewery_id,
                name: row.brewery_name,
                prefecture: row.brewery_prefecture,
                address: row.brewery_address,
                url: row.brewery_url,
                created_at: row.brewery_created_at,
            },
            sake: Sake {
                id: row.id,
                name: row.name,
                brewery_id: row.brewery_id,
                region: row.region,
                rice: row.rice,
                seimaibuai: row.seimaibuai,
                nihonshudo: row.nihonshudo,
                acid: row.acid,
                alcohol: row.alcohol,
                description: row.description,
                image_url: row.image_url,
                created_at: row.created_at,
            },
        }
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_store(query_timeout: Duration) -> PgCatalogStore {
        // Never connects: the pool opens connections on first use only.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://washu@127.0.0.1:1/washu")
            .unwrap();
        PgCatalogStore::new(pool, query_timeout)
    }

    #[tokio::test]
    async fn slow_operation_times_out_as_transient() {
        let store = lazy_store(Duration::from_millis(20));

        let err = store
            .bounded("search", std::future::pending::<AppResult<()>>())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        match err {
            AppError::TransientStore(message) => {
                assert!(message.contains("search timed out after 20ms"), "{message}");
            }
            other => panic!("expected TransientStore, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fast_operation_passes_through() {
        let store = lazy_store(Duration::from_secs(5));

        let value = store.bounded("regions", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = store
            .bounded::<(), _>("regions", async { Err(AppError::NotFound("sake not found")) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
