//! Geospatial product search engine
//!
//! Read-only and stateless per call. The catalog store prunes candidates with
//! its spatial index, but this engine re-applies every predicate in memory,
//! including the precise haversine distance, so the result set is exactly
//! the filtered set regardless of how much the store over-returns.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::geo;
use shared::models::{
    CertificationType, Product, ProductCategory, ProductCondition, ProductOrigin, SellerProfile,
    SellerType,
};
use shared::types::{DeliveryDay, GeoPoint, PickupLocation};
use shared::validation::validate_price_range;

use crate::error::{AppError, AppResult};
use crate::repositories::{ProductCatalog, ProductFilter, SellerDirectory};

/// Shown in place of a seller whose profile could not be resolved
const UNKNOWN_SELLER_NAME: &str = "Unknown seller";

fn default_radius_km() -> f64 {
    50.0
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// Result ordering; every variant breaks ties by product id so identical
/// queries paginate identically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Distance,
    PriceAsc,
    PriceDesc,
    Rating,
    Newest,
    Popular,
}

/// A buyer's search request.
///
/// Out-of-range values are rejected as client errors before any store access;
/// nothing is clamped.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    #[serde(default = "default_radius_km")]
    #[validate(range(min = 1.0, max = 500.0, message = "Search radius must be between 1 and 500 km"))]
    pub radius_km: f64,

    /// Free-text match over product name, description, and tags
    pub query: Option<String>,

    pub category: Option<ProductCategory>,

    /// Comma-separated in the query string; matches products whose
    /// certification set intersects it
    #[serde(default, deserialize_with = "comma_separated_certifications")]
    pub certifications: Vec<CertificationType>,

    pub condition: Option<ProductCondition>,

    pub origin: Option<ProductOrigin>,

    pub seller_type: Option<SellerType>,

    pub min_price: Option<Decimal>,

    pub max_price: Option<Decimal>,

    #[validate(range(min = 1.0, max = 5.0, message = "Minimum rating must be between 1 and 5"))]
    pub min_rating: Option<f64>,

    /// When set, keep only products whose seller currently delivers to the
    /// buyer's location (checked against the live profile, not the snapshot)
    #[serde(default)]
    pub delivery_available: bool,

    pub pickup_only: Option<bool>,

    #[serde(default)]
    pub sort_by: SortBy,

    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: u32,
}

fn comma_separated_certifications<'de, D>(
    deserializer: D,
) -> Result<Vec<CertificationType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            serde_json::from_value(serde_json::Value::String(s.to_string()))
                .map_err(|_| serde::de::Error::custom(format!("Unknown certification: {}", s)))
        })
        .collect()
}

impl SearchQuery {
    /// Reject invalid input and return the validated buyer location
    fn validated_location(&self) -> AppResult<GeoPoint> {
        self.validate()
            .map_err(|errors| AppError::from_validation_errors(&errors))?;

        validate_price_range(self.min_price, self.max_price)
            .map_err(|message| AppError::validation("min_price", message))?;

        GeoPoint::new(self.latitude, self.longitude)
            .map_err(|message| AppError::validation("latitude", message))
    }

    /// The store-side predicate; attribute filters are pushed down so the
    /// catalog can prune, but the engine re-checks everything
    fn to_filter(&self, buyer: GeoPoint) -> ProductFilter {
        ProductFilter {
            center: Some(buyer),
            radius_km: Some(self.radius_km),
            text: self.query.clone(),
            category: self.category,
            certifications: self.certifications.clone(),
            condition: self.condition,
            origin: self.origin,
            seller_type: self.seller_type,
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating.and_then(Decimal::from_f64),
            pickup_only: self.pickup_only,
            ..ProductFilter::searchable()
        }
    }

    /// The AND-combined attribute predicate (everything except the spatial
    /// and live-delivery checks)
    fn matches_attributes(&self, product: &Product) -> bool {
        if let Some(text) = &self.query {
            let needle = text.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&needle);
            let in_description = product.description.to_lowercase().contains(&needle);
            let in_tags = product
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle));
            if !(in_name || in_description || in_tags) {
                return false;
            }
        }

        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }

        if !self.certifications.is_empty()
            && !self
                .certifications
                .iter()
                .any(|c| product.certifications.contains(c))
        {
            return false;
        }

        if let Some(condition) = self.condition {
            if product.condition != condition {
                return false;
            }
        }

        if let Some(origin) = self.origin {
            if product.origin != origin {
                return false;
            }
        }

        if let Some(seller_type) = self.seller_type {
            if product.seller_type != seller_type {
                return false;
            }
        }

        if let Some(min_price) = self.min_price {
            if product.price < min_price {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if product.price > max_price {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating.and_then(Decimal::from_f64) {
            if product.average_rating < min_rating {
                return false;
            }
        }

        if let Some(pickup_only) = self.pickup_only {
            if product.pickup_only != pickup_only {
                return false;
            }
        }

        true
    }
}

/// Seller snapshot attached to each search result
#[derive(Debug, Clone, Serialize)]
pub struct SellerInfo {
    pub id: Uuid,
    pub name: String,
    pub seller_type: SellerType,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub delivery_radius_km: Option<i32>,
    pub delivery_days: Vec<DeliveryDay>,
    pub pickup_locations: Vec<PickupLocation>,
    pub average_rating: Decimal,
    pub total_reviews: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub product: Product,
    pub distance_km: f64,
    pub seller: SellerInfo,
    pub delivery_available: bool,
    pub pickup_available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub search_radius_km: f64,
    pub user_location: GeoPoint,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub meta: SearchMeta,
}

struct Match {
    product: Product,
    distance_km: f64,
}

type SellerKey = (Uuid, SellerType);

/// Location-aware product discovery over the denormalized catalog
pub struct GeoSearchEngine {
    catalog: Arc<dyn ProductCatalog>,
    directory: Arc<dyn SellerDirectory>,
}

impl GeoSearchEngine {
    pub fn new(catalog: Arc<dyn ProductCatalog>, directory: Arc<dyn SellerDirectory>) -> Self {
        Self { catalog, directory }
    }

    pub async fn search(&self, query: SearchQuery) -> AppResult<SearchResponse> {
        let buyer = query.validated_location()?;

        let candidates = self.catalog.find_matching(&query.to_filter(buyer)).await?;
        tracing::debug!(candidates = candidates.len(), "Catalog returned candidates");

        let mut matches: Vec<Match> = candidates
            .into_iter()
            .filter_map(|product| {
                if !product.is_searchable() {
                    return None;
                }
                // Never-synced products have no snapshot and cannot be placed
                let point = product.cached_point()?;
                let distance_km = geo::distance_km(&buyer, &point);
                if distance_km > query.radius_km {
                    return None;
                }
                if !query.matches_attributes(&product) {
                    return None;
                }
                Some(Match {
                    product,
                    distance_km,
                })
            })
            .collect();

        // Live seller data, one batched lookup per distinct seller. Loaded
        // for every match when the delivery filter applies, otherwise only
        // for the page being returned.
        let mut sellers: HashMap<SellerKey, SellerProfile> = HashMap::new();

        if query.delivery_available {
            self.load_sellers(&mut sellers, matches.iter().map(Match::seller_key))
                .await?;
            matches.retain(|m| {
                delivery_available(&m.product, sellers.get(&m.seller_key()), &buyer)
            });
        }

        sort_matches(&mut matches, query.sort_by);

        let total = matches.len() as u64;
        let offset = (query.page as usize - 1) * query.limit as usize;
        let page_items: Vec<Match> = matches
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();

        self.load_sellers(&mut sellers, page_items.iter().map(Match::seller_key))
            .await?;

        let results = page_items
            .into_iter()
            .map(|m| {
                let seller = sellers.get(&m.seller_key());
                build_result(m, seller, &buyer)
            })
            .collect();

        Ok(SearchResponse {
            results,
            meta: SearchMeta {
                total,
                page: query.page,
                limit: query.limit,
                total_pages: ((total + query.limit as u64 - 1) / query.limit as u64) as u32,
                search_radius_km: query.radius_km,
                user_location: buyer,
            },
        })
    }

    /// Resolve any not-yet-loaded sellers in one batched directory call.
    ///
    /// A lookup miss is not an error: the affected results degrade to their
    /// cached fields.
    async fn load_sellers(
        &self,
        sellers: &mut HashMap<SellerKey, SellerProfile>,
        keys: impl Iterator<Item = SellerKey>,
    ) -> AppResult<()> {
        let missing: Vec<SellerKey> = keys
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|key| !sellers.contains_key(key))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        for profile in self.directory.get_many(&missing).await? {
            if let Some(user_id) = profile.user_id {
                sellers.insert((user_id, profile.seller_type), profile);
            }
        }

        Ok(())
    }
}

impl Match {
    fn seller_key(&self) -> SellerKey {
        (self.product.seller_id, self.product.seller_type)
    }
}

fn sort_matches(matches: &mut [Match], sort_by: SortBy) {
    match sort_by {
        SortBy::Distance => matches.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.product.id.cmp(&b.product.id))
        }),
        SortBy::PriceAsc => matches.sort_by(|a, b| {
            a.product
                .price
                .cmp(&b.product.price)
                .then_with(|| a.product.id.cmp(&b.product.id))
        }),
        SortBy::PriceDesc => matches.sort_by(|a, b| {
            b.product
                .price
                .cmp(&a.product.price)
                .then_with(|| a.product.id.cmp(&b.product.id))
        }),
        SortBy::Rating => matches.sort_by(|a, b| {
            b.product
                .average_rating
                .cmp(&a.product.average_rating)
                .then_with(|| a.product.id.cmp(&b.product.id))
        }),
        SortBy::Newest => matches.sort_by(|a, b| {
            b.product
                .created_at
                .cmp(&a.product.created_at)
                .then_with(|| a.product.id.cmp(&b.product.id))
        }),
        SortBy::Popular => matches.sort_by(|a, b| {
            b.product
                .sales_count
                .cmp(&a.product.sales_count)
                .then_with(|| a.product.id.cmp(&b.product.id))
        }),
    }
}

/// Whether the seller currently delivers to the buyer's location.
///
/// The live profile wins because the product's snapshot may be stale; the
/// snapshot only stands in when the profile cannot be resolved at all.
fn delivery_available(product: &Product, seller: Option<&SellerProfile>, buyer: &GeoPoint) -> bool {
    match seller {
        Some(profile) => match profile.location() {
            Some(origin) => {
                profile.delivery_radius_km as f64 >= geo::distance_km(&origin, buyer)
            }
            None => false,
        },
        None => match (product.cached_point(), product.seller_delivery_radius_km) {
            (Some(origin), Some(radius_km)) => radius_km as f64 >= geo::distance_km(&origin, buyer),
            _ => false,
        },
    }
}

fn build_result(m: Match, seller: Option<&SellerProfile>, buyer: &GeoPoint) -> SearchResult {
    let delivery = delivery_available(&m.product, seller, buyer);

    let (seller_info, pickup_available) = match seller {
        Some(profile) => {
            let info = SellerInfo {
                id: m.product.seller_id,
                name: profile.display_name.clone(),
                seller_type: profile.seller_type,
                location: profile.location(),
                address: profile.address.clone(),
                delivery_radius_km: Some(profile.delivery_radius_km),
                delivery_days: profile.delivery_days.clone(),
                pickup_locations: profile.pickup_locations.clone(),
                average_rating: profile.average_rating,
                total_reviews: profile.total_reviews,
            };
            let pickup = !profile.pickup_locations.is_empty() || m.product.pickup_only;
            (info, pickup)
        }
        None => {
            // Degrade to the cached product fields rather than failing the
            // whole request.
            let info = SellerInfo {
                id: m.product.seller_id,
                name: UNKNOWN_SELLER_NAME.to_string(),
                seller_type: m.product.seller_type,
                location: m.product.cached_point(),
                address: m.product.seller_address.clone(),
                delivery_radius_km: m.product.seller_delivery_radius_km,
                delivery_days: Vec::new(),
                pickup_locations: Vec::new(),
                average_rating: Decimal::ZERO,
                total_reviews: 0,
            };
            (info, m.product.pickup_only)
        }
    };

    SearchResult {
        distance_km: m.distance_km,
        seller: seller_info,
        delivery_available: delivery,
        pickup_available,
        product: m.product,
    }
}
