//! Location sync HTTP handlers
//!
//! Operator-facing triggers: a single-seller sync runs after a
//! profile-location update; the full resync exists for migrations, backfills,
//! and drift repair.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::SellerType;
use crate::repositories::{
    PgProductCatalog, PgSellerDirectory, ProductCatalog, ProductFilter, SellerDirectory,
    StoreOptions,
};
use crate::services::location_sync::{
    LocationSyncEngine, SyncAllReport, SyncCheckpoint, SyncOptions,
};
use crate::AppState;

#[derive(Deserialize)]
pub struct SyncAllRequest {
    /// Checkpoint from a previous run's logs; resumes after that seller
    pub resume_from: Option<SyncCheckpoint>,
}

#[derive(Serialize)]
pub struct SyncSellerResponse {
    pub updated: u64,
}

#[derive(Serialize)]
pub struct SyncStatusResponse {
    /// Sellable products whose location snapshot was never populated
    pub products_missing_location: i64,
}

/// Sync one seller's products after a profile-location change
pub async fn sync_seller(
    State(state): State<AppState>,
    Path((seller_type, user_id)): Path<(String, Uuid)>,
) -> AppResult<Json<SyncSellerResponse>> {
    let seller_type: SellerType = seller_type
        .parse()
        .map_err(|_| AppError::validation("seller_type", "Seller type must be farmer or retailer"))?;

    let engine = sync_engine(&state);
    let updated = engine.sync_seller_products(user_id, seller_type).await?;

    Ok(Json(SyncSellerResponse { updated }))
}

/// Sync one seller's products, addressed by business slug
pub async fn sync_seller_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<SyncSellerResponse>> {
    let directory = seller_directory(&state);
    let Some((user_id, seller_type)) = directory.get_by_slug(&slug).await? else {
        return Err(AppError::NotFound("Seller".to_string()));
    };

    let engine = sync_engine(&state);
    let updated = engine.sync_seller_products(user_id, seller_type).await?;

    Ok(Json(SyncSellerResponse { updated }))
}

/// Full resync over every seller (batch/backfill trigger)
pub async fn sync_all(
    State(state): State<AppState>,
    body: Option<Json<SyncAllRequest>>,
) -> AppResult<Json<SyncAllReport>> {
    let resume_from = body.and_then(|Json(request)| request.resume_from);

    let engine = sync_engine(&state);
    let report = engine.sync_all(resume_from).await?;

    Ok(Json(report))
}

/// Drift visibility: how many sellable products still lack a snapshot
pub async fn sync_status(State(state): State<AppState>) -> AppResult<Json<SyncStatusResponse>> {
    let catalog = product_catalog(&state);
    let products_missing_location = catalog
        .count_matching(&ProductFilter::missing_location())
        .await?;

    Ok(Json(SyncStatusResponse {
        products_missing_location,
    }))
}

fn sync_engine(state: &AppState) -> LocationSyncEngine {
    let options = StoreOptions::from(&state.config.store);
    LocationSyncEngine::new(
        Arc::new(PgSellerDirectory::new(state.db.clone(), options)),
        Arc::new(PgProductCatalog::new(state.db.clone(), options)),
        SyncOptions::from(&state.config.sync),
    )
}

fn seller_directory(state: &AppState) -> PgSellerDirectory {
    PgSellerDirectory::new(state.db.clone(), StoreOptions::from(&state.config.store))
}

fn product_catalog(state: &AppState) -> PgProductCatalog {
    PgProductCatalog::new(state.db.clone(), StoreOptions::from(&state.config.store))
}
