#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] wraps the real catalog routes and service over an in-memory
//! store seeded from `washu_test_utils` fixtures, so HTTP behavior can be
//! checked without a database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use washu_catalog::AppState;
use washu_catalog::catalog::{MemoryCatalogStore, SeedData};
use washu_test_utils::{SeedBuilder, sample_catalog};

/// Test application over the real routes and an in-memory store.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryCatalogStore>,
}

impl TestApp {
    /// App over the sample catalog.
    pub fn new() -> Self {
        Self::from_seed(&sample_catalog())
    }

    /// App over an arbitrary seed document.
    pub fn from_seed(seed: &SeedBuilder) -> Self {
        let seed = SeedData::from_json(&seed.build_string()).expect("Invalid seed fixture");
        Self::with_store(MemoryCatalogStore::from_seed(&seed))
    }

    /// App over a prepared store.
    pub fn with_store(store: MemoryCatalogStore) -> Self {
        let store = Arc::new(store);
        let state = AppState::with_store(store.clone());
        let router = washu_catalog::routes::router().with_state(state);
        Self { router, store }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri` and return status plus the JSON body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .request(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status();
        (status, response_json(response).await)
    }
}

/// Collect a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
