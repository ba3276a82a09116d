// HTTP request handlers
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use restaurant_search_shared::{GeoSearchQuery, Restaurant, SearchResult};
use tracing::{info, instrument};

use crate::errors::ApiError;
use crate::server::state::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Restaurant search API is running")
}

/// Ingest endpoint - upserts a JSON array of restaurants, keyed by id
///
/// The body is decoded by hand rather than through the `Json` extractor so a
/// missing or wrong content type is not treated differently from bad JSON.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn create_restaurants(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let restaurants: Vec<Restaurant> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::invalid_input(format!("Invalid JSON: {}", e)))?;

    info!("Received {} restaurants", restaurants.len());

    state.service.ingest(restaurants).await?;
    Ok(StatusCode::OK)
}

/// Search endpoint - `?q=<term>&lat=<lat>&lng=<lng>`
#[instrument(skip(state, query))]
pub async fn search_restaurants(
    State(state): State<AppState>,
    query: Result<Query<GeoSearchQuery>, QueryRejection>,
) -> Result<Json<SearchResult>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::invalid_input(e.body_text()))?;

    let result = state.service.search(&query).await?;

    info!(
        q = %query.q,
        returned = result.len(),
        "Search served"
    );
    Ok(Json(result))
}
