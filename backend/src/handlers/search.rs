//! Product search HTTP handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::repositories::{PgProductCatalog, PgSellerDirectory, StoreOptions};
use crate::services::search::{GeoSearchEngine, SearchQuery, SearchResponse};
use crate::AppState;

/// Location-based product search.
///
/// All [`SearchQuery`] fields are accepted as query parameters;
/// `certifications` is a comma-separated list.
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let engine = search_engine(&state);
    let response = engine.search(query).await?;
    Ok(Json(response))
}

fn search_engine(state: &AppState) -> GeoSearchEngine {
    let options = StoreOptions::from(&state.config.store);
    GeoSearchEngine::new(
        Arc::new(PgProductCatalog::new(state.db.clone(), options)),
        Arc::new(PgSellerDirectory::new(state.db.clone(), options)),
    )
}
