//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{CatalogService, CatalogStore, PgCatalogStore};
use crate::config::Config;
use crate::db;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Read-only catalog queries.
    catalog: CatalogService,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations and build the catalog service.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        info!(
            max_connections = config.database_max_connections,
            query_timeout_ms = config.query_timeout.as_millis() as u64,
            "Catalog store ready"
        );

        let store = PgCatalogStore::new(pool, config.query_timeout);
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Build state over an arbitrary catalog store.
    pub fn with_store(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(store),
            }),
        }
    }

    /// Get the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Check if the catalog store is reachable.
    pub async fn postgres_healthy(&self) -> bool {
        self.inner.catalog.store_healthy().await
    }
}
