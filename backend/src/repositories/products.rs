//! Postgres-backed product catalog

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use async_trait::async_trait;
use shared::models::{LocationSnapshot, Product, SellerType};

use crate::error::AppResult;
use crate::repositories::{
    parse_variant, variant_str, with_store_guard, ProductCatalog, ProductFilter, StoreOptions,
};

const PRODUCT_COLUMNS: &str = "id, name, description, category, status, price, quantity, unit, \
     tags, certifications, condition, seller_id, seller_type, business_name, origin, \
     is_available, pickup_only, average_rating, review_count, sales_count, slug, \
     created_at, updated_at, deleted_at, \
     seller_latitude, seller_longitude, seller_address, seller_delivery_radius_km";

/// Product catalog backed by the `products` table.
///
/// The spatial predicate uses the GIST index on `seller_location` with a
/// small slack factor, so the store may over-return near the radius edge;
/// the search engine's haversine check is authoritative.
#[derive(Clone)]
pub struct PgProductCatalog {
    pool: PgPool,
    options: StoreOptions,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    category: String,
    status: String,
    price: Decimal,
    quantity: i32,
    unit: String,
    tags: Option<Vec<String>>,
    certifications: Option<Vec<String>>,
    condition: String,
    seller_id: Uuid,
    seller_type: String,
    business_name: Option<String>,
    origin: String,
    is_available: bool,
    pickup_only: bool,
    average_rating: Decimal,
    review_count: i32,
    sales_count: i32,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    seller_latitude: Option<Decimal>,
    seller_longitude: Option<Decimal>,
    seller_address: Option<String>,
    seller_delivery_radius_km: Option<i32>,
}

impl ProductRow {
    fn into_product(self) -> AppResult<Product> {
        let certifications = self
            .certifications
            .unwrap_or_default()
            .iter()
            .map(|c| parse_variant("certification", c))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Product {
            id: self.id,
            name: self.name,
            description: self.description,
            category: parse_variant("category", &self.category)?,
            status: parse_variant("status", &self.status)?,
            price: self.price,
            quantity: self.quantity,
            unit: parse_variant("unit", &self.unit)?,
            tags: self.tags.unwrap_or_default(),
            certifications,
            condition: parse_variant("condition", &self.condition)?,
            seller_id: self.seller_id,
            seller_type: parse_variant("seller_type", &self.seller_type)?,
            business_name: self.business_name,
            origin: parse_variant("origin", &self.origin)?,
            is_available: self.is_available,
            pickup_only: self.pickup_only,
            average_rating: self.average_rating,
            review_count: self.review_count,
            sales_count: self.sales_count,
            slug: self.slug,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            seller_latitude: self.seller_latitude,
            seller_longitude: self.seller_longitude,
            seller_address: self.seller_address,
            seller_delivery_radius_km: self.seller_delivery_radius_km,
        })
    }
}

impl PgProductCatalog {
    pub fn new(pool: PgPool, options: StoreOptions) -> Self {
        Self { pool, options }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if filter.searchable_only {
        qb.push(" AND status = 'active' AND is_available = TRUE AND deleted_at IS NULL");
    }

    match filter.with_snapshot {
        Some(true) => {
            qb.push(" AND seller_latitude IS NOT NULL AND seller_longitude IS NOT NULL");
        }
        Some(false) => {
            qb.push(" AND (seller_latitude IS NULL OR seller_longitude IS NULL)");
        }
        None => {}
    }

    if let (Some(center), Some(radius_km)) = (filter.center, filter.radius_km) {
        // 1% slack keeps spheroid/sphere rounding from dropping edge rows;
        // rows without a derived point fall through to the engine's check.
        qb.push(" AND (seller_location IS NULL OR ST_DWithin(seller_location, ST_SetSRID(ST_MakePoint(");
        qb.push_bind(center.longitude);
        qb.push(", ");
        qb.push_bind(center.latitude);
        qb.push("), 4326)::geography, ");
        qb.push_bind(radius_km * 1010.0);
        qb.push("))");
    }

    if let Some(text) = &filter.text {
        let pattern = format!("%{}%", text);
        qb.push(" AND (name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ");
        qb.push_bind(pattern);
        qb.push("))");
    }

    if let Some(category) = &filter.category {
        qb.push(" AND category = ");
        qb.push_bind(variant_str(category));
    }

    if !filter.certifications.is_empty() {
        let values: Vec<String> = filter.certifications.iter().map(variant_str).collect();
        qb.push(" AND certifications && ");
        qb.push_bind(values);
    }

    if let Some(condition) = &filter.condition {
        qb.push(" AND condition = ");
        qb.push_bind(variant_str(condition));
    }

    if let Some(origin) = &filter.origin {
        qb.push(" AND origin = ");
        qb.push_bind(variant_str(origin));
    }

    if let Some(seller_type) = &filter.seller_type {
        qb.push(" AND seller_type = ");
        qb.push_bind(variant_str(seller_type));
    }

    if let Some(min_price) = filter.min_price {
        qb.push(" AND price >= ");
        qb.push_bind(min_price);
    }

    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ");
        qb.push_bind(max_price);
    }

    if let Some(min_rating) = filter.min_rating {
        qb.push(" AND average_rating >= ");
        qb.push_bind(min_rating);
    }

    if let Some(pickup_only) = filter.pickup_only {
        qb.push(" AND pickup_only = ");
        qb.push_bind(pickup_only);
    }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn find_matching(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let rows = with_store_guard("product search", &self.options, || {
            let pool = self.pool.clone();
            let filter = filter.clone();
            async move {
                let mut qb = QueryBuilder::new(format!(
                    "SELECT {} FROM products WHERE 1=1",
                    PRODUCT_COLUMNS
                ));
                push_filters(&mut qb, &filter);
                qb.push(" ORDER BY id ASC");
                qb.build_query_as::<ProductRow>().fetch_all(&pool).await
            }
        })
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn count_matching(&self, filter: &ProductFilter) -> AppResult<i64> {
        with_store_guard("product count", &self.options, || {
            let pool = self.pool.clone();
            let filter = filter.clone();
            async move {
                let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
                push_filters(&mut qb, &filter);
                qb.build_query_scalar::<i64>().fetch_one(&pool).await
            }
        })
        .await
    }

    async fn bulk_update_location(
        &self,
        seller_id: Uuid,
        seller_type: SellerType,
        snapshot: &LocationSnapshot,
    ) -> AppResult<u64> {
        // Idempotent by construction (pure overwrite with canonical state),
        // so the bounded retry in the store guard is safe here too.
        with_store_guard("product location update", &self.options, || {
            let pool = self.pool.clone();
            let snapshot = snapshot.clone();
            async move {
                sqlx::query(
                    r#"
                    UPDATE products
                    SET seller_latitude = $1,
                        seller_longitude = $2,
                        seller_address = $3,
                        seller_delivery_radius_km = $4,
                        seller_location = ST_SetSRID(ST_MakePoint($2::float8, $1::float8), 4326)::geography,
                        updated_at = NOW()
                    WHERE seller_id = $5 AND seller_type = $6
                    "#,
                )
                .bind(snapshot.latitude)
                .bind(snapshot.longitude)
                .bind(snapshot.address.clone())
                .bind(snapshot.delivery_radius_km)
                .bind(seller_id)
                .bind(variant_str(&seller_type))
                .execute(&pool)
                .await
                .map(|result| result.rows_affected())
            }
        })
        .await
    }
}
