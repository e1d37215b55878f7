//! Repository interfaces over the marketplace stores
//!
//! The engines depend on these traits rather than on the database directly,
//! so the seller directory and product catalog can be swapped for in-memory
//! implementations in tests. The Postgres implementations wrap every call in
//! a configured deadline and retry idempotent operations a bounded number of
//! times on transient failures.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{
    CertificationType, LocationSnapshot, Product, ProductCategory, ProductCondition,
    ProductOrigin, SellerProfile, SellerType,
};
use shared::types::GeoPoint;

use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};

pub mod products;
pub mod sellers;

pub use products::PgProductCatalog;
pub use sellers::PgSellerDirectory;

/// Read access to canonical seller profiles
#[async_trait]
pub trait SellerDirectory: Send + Sync {
    /// Look up the profile owned by a user account
    async fn get_by_user_id(
        &self,
        user_id: Uuid,
        seller_type: SellerType,
    ) -> AppResult<Option<SellerProfile>>;

    /// Resolve a business slug to its owner; slugs are unique across both
    /// seller kinds jointly
    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<(Uuid, SellerType)>>;

    /// Batched profile lookup; missing sellers are simply absent from the
    /// result
    async fn get_many(&self, keys: &[(Uuid, SellerType)]) -> AppResult<Vec<SellerProfile>>;

    /// Every profile of one seller kind, ordered by profile id
    async fn list(&self, seller_type: SellerType) -> AppResult<Vec<SellerProfile>>;
}

/// Read and location-write access to the product catalog.
///
/// The cached seller-location columns are owned by the sync engine (writer)
/// and the search engine (reader); no other component writes them.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Products matching the filter. Implementations may over-return around
    /// the spatial predicate (the search engine re-applies the precise
    /// distance check) but must never drop a matching product.
    async fn find_matching(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;

    /// Number of products matching the filter
    async fn count_matching(&self, filter: &ProductFilter) -> AppResult<i64>;

    /// Overwrite the cached location snapshot on every product owned by the
    /// seller; returns the number of rows touched. Idempotent.
    async fn bulk_update_location(
        &self,
        seller_id: Uuid,
        seller_type: SellerType,
        snapshot: &LocationSnapshot,
    ) -> AppResult<u64>;
}

/// Attribute predicate pushed down to the catalog store.
///
/// All set fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Spatial pre-filter center; paired with `radius_km`
    pub center: Option<GeoPoint>,
    pub radius_km: Option<f64>,
    pub text: Option<String>,
    pub category: Option<ProductCategory>,
    /// Match products whose certification set intersects this set
    pub certifications: Vec<CertificationType>,
    pub condition: Option<ProductCondition>,
    pub origin: Option<ProductOrigin>,
    pub seller_type: Option<SellerType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<Decimal>,
    pub pickup_only: Option<bool>,
    /// Restrict to active, available, non-deleted products
    pub searchable_only: bool,
    /// `Some(true)`: snapshot coordinates required; `Some(false)`: missing
    pub with_snapshot: Option<bool>,
}

impl ProductFilter {
    /// Base filter for the public search path
    pub fn searchable() -> Self {
        Self {
            searchable_only: true,
            with_snapshot: Some(true),
            ..Self::default()
        }
    }

    /// Sellable products whose snapshot was never populated (sync drift)
    pub fn missing_location() -> Self {
        Self {
            searchable_only: true,
            with_snapshot: Some(false),
            ..Self::default()
        }
    }
}

/// Deadline and retry settings applied to every store call
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub statement_timeout: Duration,
    pub max_retries: u32,
}

impl From<&StoreConfig> for StoreOptions {
    fn from(config: &StoreConfig) -> Self {
        Self {
            statement_timeout: config.statement_timeout(),
            max_retries: config.max_retries,
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            statement_timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }
}

/// Run an idempotent store operation under the configured deadline,
/// retrying transient failures up to `max_retries` additional attempts.
pub(crate) async fn with_store_guard<T, F, Fut>(
    operation: &'static str,
    options: &StoreOptions,
    run: F,
) -> AppResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match tokio::time::timeout(options.statement_timeout, run()).await {
            Err(_) => return Err(AppError::StoreTimeout(operation.to_string())),
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) if attempt <= options.max_retries && is_transient(&error) => {
                tracing::warn!(
                    operation,
                    attempt,
                    error = %error,
                    "Transient store error, retrying"
                );
            }
            Ok(Err(error)) => return Err(error.into()),
        }
    }
}

fn is_transient(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

/// Decode a stored enum value through its serde representation
pub(crate) fn parse_variant<T: serde::de::DeserializeOwned>(
    column: &str,
    value: &str,
) -> AppResult<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|_| {
        AppError::Internal(format!("Unknown {} value in store: {}", column, value))
    })
}

/// Encode an enum value to its stored serde representation
pub(crate) fn variant_str<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}
