//! Postgres-backed seller directory
//!
//! Farmers and retailers live in separate tables; this repository projects
//! both onto the unified [`SellerProfile`] the engines work with.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use async_trait::async_trait;
use shared::models::{SellerProfile, SellerType};
use shared::types::{DeliveryDay, PickupLocation};

use crate::error::AppResult;
use crate::repositories::{parse_variant, with_store_guard, SellerDirectory, StoreOptions};

/// Seller directory backed by the `farmers` and `retailers` tables
#[derive(Clone)]
pub struct PgSellerDirectory {
    pool: PgPool,
    options: StoreOptions,
}

#[derive(sqlx::FromRow)]
struct SellerRow {
    id: Uuid,
    user_id: Option<Uuid>,
    display_name: String,
    business_slug: String,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    address: Option<String>,
    delivery_radius_km: i32,
    delivery_days: Option<serde_json::Value>,
    pickup_locations: Option<serde_json::Value>,
    average_rating: Decimal,
    total_reviews: i32,
}

impl SellerRow {
    fn into_profile(self, seller_type: SellerType) -> SellerProfile {
        SellerProfile {
            id: self.id,
            user_id: self.user_id,
            seller_type,
            display_name: self.display_name,
            business_slug: self.business_slug,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address,
            delivery_radius_km: self.delivery_radius_km,
            delivery_days: decode_json_list::<DeliveryDay>("delivery_days", self.delivery_days),
            pickup_locations: decode_json_list::<PickupLocation>(
                "pickup_locations",
                self.pickup_locations,
            ),
            average_rating: self.average_rating,
            total_reviews: self.total_reviews,
        }
    }
}

/// Decode a JSONB list column, tolerating NULL and malformed content.
///
/// A seller with an unreadable delivery-day or pickup list should still be
/// searchable, so decode failures degrade to an empty list with a warning.
fn decode_json_list<T: serde::de::DeserializeOwned>(
    column: &str,
    value: Option<serde_json::Value>,
) -> Vec<T> {
    match value {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(raw) => serde_json::from_value(raw).unwrap_or_else(|error| {
            tracing::warn!(column, %error, "Malformed JSON list in seller row, ignoring");
            Vec::new()
        }),
    }
}

/// Table and column projection for one seller kind.
///
/// Matched exhaustively so a third seller kind cannot be added without
/// extending the directory.
fn select_for(seller_type: SellerType) -> (&'static str, &'static str) {
    match seller_type {
        SellerType::Farmer => (
            "farmers",
            "id, user_id, farm_name AS display_name, business_slug, latitude, longitude, \
             farm_address AS address, delivery_radius_km, delivery_days, pickup_locations, \
             average_rating, total_reviews",
        ),
        SellerType::Retailer => (
            "retailers",
            "id, user_id, business_name AS display_name, business_slug, latitude, longitude, \
             business_address AS address, delivery_radius_km, delivery_days, pickup_locations, \
             average_rating, total_reviews",
        ),
    }
}

impl PgSellerDirectory {
    pub fn new(pool: PgPool, options: StoreOptions) -> Self {
        Self { pool, options }
    }

    async fn fetch_by_user_ids(
        &self,
        user_ids: Vec<Uuid>,
        seller_type: SellerType,
    ) -> AppResult<Vec<SellerProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (table, columns) = select_for(seller_type);
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = ANY($1) ORDER BY id ASC",
            columns, table
        );

        let rows = with_store_guard("seller lookup", &self.options, || {
            let pool = self.pool.clone();
            let sql = sql.clone();
            let user_ids = user_ids.clone();
            async move {
                sqlx::query_as::<_, SellerRow>(&sql)
                    .bind(user_ids)
                    .fetch_all(&pool)
                    .await
            }
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_profile(seller_type))
            .collect())
    }
}

#[async_trait]
impl SellerDirectory for PgSellerDirectory {
    async fn get_by_user_id(
        &self,
        user_id: Uuid,
        seller_type: SellerType,
    ) -> AppResult<Option<SellerProfile>> {
        let (table, columns) = select_for(seller_type);
        let sql = format!("SELECT {} FROM {} WHERE user_id = $1", columns, table);

        let row = with_store_guard("seller lookup", &self.options, || {
            let pool = self.pool.clone();
            let sql = sql.clone();
            async move {
                sqlx::query_as::<_, SellerRow>(&sql)
                    .bind(user_id)
                    .fetch_optional(&pool)
                    .await
            }
        })
        .await?;

        Ok(row.map(|row| row.into_profile(seller_type)))
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<(Uuid, SellerType)>> {
        // Slugs are unique across both seller kinds jointly, so the first
        // hit is the only one.
        let row = with_store_guard("slug lookup", &self.options, || {
            let pool = self.pool.clone();
            let slug = slug.to_string();
            async move {
                sqlx::query_as::<_, (Option<Uuid>, String)>(
                    r#"
                    SELECT user_id, 'farmer' AS seller_type FROM farmers WHERE business_slug = $1
                    UNION ALL
                    SELECT user_id, 'retailer' AS seller_type FROM retailers WHERE business_slug = $1
                    LIMIT 1
                    "#,
                )
                .bind(slug)
                .fetch_optional(&pool)
                .await
            }
        })
        .await?;

        match row {
            Some((Some(user_id), seller_type)) => {
                let seller_type = parse_variant("seller_type", &seller_type)?;
                Ok(Some((user_id, seller_type)))
            }
            _ => Ok(None),
        }
    }

    async fn get_many(&self, keys: &[(Uuid, SellerType)]) -> AppResult<Vec<SellerProfile>> {
        let farmer_ids: Vec<Uuid> = keys
            .iter()
            .filter(|(_, t)| *t == SellerType::Farmer)
            .map(|(id, _)| *id)
            .collect();
        let retailer_ids: Vec<Uuid> = keys
            .iter()
            .filter(|(_, t)| *t == SellerType::Retailer)
            .map(|(id, _)| *id)
            .collect();

        let mut profiles = self
            .fetch_by_user_ids(farmer_ids, SellerType::Farmer)
            .await?;
        profiles.extend(
            self.fetch_by_user_ids(retailer_ids, SellerType::Retailer)
                .await?,
        );

        Ok(profiles)
    }

    async fn list(&self, seller_type: SellerType) -> AppResult<Vec<SellerProfile>> {
        let (table, columns) = select_for(seller_type);
        let sql = format!("SELECT {} FROM {} ORDER BY id ASC", columns, table);

        let rows = with_store_guard("seller listing", &self.options, || {
            let pool = self.pool.clone();
            let sql = sql.clone();
            async move {
                sqlx::query_as::<_, SellerRow>(&sql)
                    .fetch_all(&pool)
                    .await
            }
        })
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_profile(seller_type))
            .collect())
    }
}
