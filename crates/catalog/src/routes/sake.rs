//! Sake search and detail endpoints.

use std::num::IntErrorKind;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::catalog::types::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::catalog::{SakeDetail, SearchPage, SearchRequest};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Raw search query string.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub region: Option<String>,
    pub sweetness: Option<i64>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

/// GET /api/v1/sake/search
async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<SearchPage>> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let request = SearchRequest::new(
        query.q,
        query.region,
        query.sweetness,
        query.page,
        query.per_page,
    )?;

    let page = state.catalog().search(&request).await?;
    Ok(Json(page))
}

/// GET /api/v1/sake/{id}
async fn detail(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<SakeDetail>> {
    let Path(raw) = id.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let id = parse_sake_id(&raw)?;

    let sake = state.catalog().detail(id).await?;
    Ok(Json(sake))
}

/// Parse a path id. Integers outside the id column's range cannot name a
/// stored sake, so they are NotFound rather than invalid.
fn parse_sake_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            AppError::NotFound("sake not found")
        }
        _ => AppError::InvalidInput(format!("id must be an integer, got {raw:?}")),
    })
}

/// Create the sake router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/sake/search", get(search))
        .route("/api/v1/sake/{id}", get(detail))
}
