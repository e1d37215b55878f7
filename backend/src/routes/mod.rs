//! Route definitions for the Harvest Market backend

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Buyer-facing product discovery
        .route("/search", get(handlers::search_products))
        // Operator-facing location sync triggers
        .nest("/sync", sync_routes())
}

/// Location sync routes
fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/all", post(handlers::sync_all))
        .route("/status", get(handlers::sync_status))
        .route("/sellers/by-slug/:slug", post(handlers::sync_seller_by_slug))
        .route("/sellers/:seller_type/:user_id", post(handlers::sync_seller))
}
