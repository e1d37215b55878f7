//! Harvest Market - Backend Core
//!
//! Geospatial product discovery for a farm-direct marketplace: buyers search
//! for products within a travel radius of their location, and a location
//! sync engine keeps the denormalized seller coordinates on every product
//! consistent with the canonical seller profiles.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
}
