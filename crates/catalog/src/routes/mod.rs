//! HTTP route handlers.

pub mod cors;
pub mod health;
pub mod meta;
pub mod sake;

use axum::Router;

use crate::state::AppState;

/// All catalog routes, without state or middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(sake::router())
        .merge(meta::router())
}
