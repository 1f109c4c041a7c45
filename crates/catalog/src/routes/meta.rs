//! Facet endpoints for client filter UIs.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct RegionsResponse {
    regions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TasteTagsResponse {
    tags: Vec<String>,
}

/// GET /api/v1/meta/regions
async fn regions(State(state): State<AppState>) -> AppResult<Json<RegionsResponse>> {
    let regions = state.catalog().regions().await?;
    Ok(Json(RegionsResponse { regions }))
}

/// GET /api/v1/meta/taste-tags
async fn taste_tags(State(state): State<AppState>) -> AppResult<Json<TasteTagsResponse>> {
    let tags = state.catalog().tag_labels().await?;
    Ok(Json(TasteTagsResponse { tags }))
}

/// Create the facet router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/meta/regions", get(regions))
        .route("/api/v1/meta/taste-tags", get(taste_tags))
}
