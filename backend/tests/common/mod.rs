//! In-memory repository implementations and fixtures for the engine tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use market_core::error::{AppError, AppResult};
use market_core::repositories::{ProductCatalog, ProductFilter, SellerDirectory};
use market_core::services::search::{SearchQuery, SortBy};
use shared::models::{
    LocationSnapshot, Product, ProductCategory, ProductCondition, ProductOrigin, ProductStatus,
    SellerProfile, SellerType, UnitType,
};
use shared::types::DeliveryDay;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// In-memory seller directory
// ============================================================================

#[derive(Default)]
pub struct InMemorySellerDirectory {
    profiles: Mutex<Vec<SellerProfile>>,
    failing_users: Mutex<HashSet<Uuid>>,
    pub profile_lookups: AtomicUsize,
    pub batch_lookups: AtomicUsize,
}

impl InMemorySellerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: SellerProfile) {
        self.profiles.lock().unwrap().push(profile);
    }

    /// Make `get_by_user_id` fail for this user, simulating a broken record
    pub fn fail_for(&self, user_id: Uuid) {
        self.failing_users.lock().unwrap().insert(user_id);
    }

    pub fn set_location(&self, user_id: Uuid, seller_type: SellerType, lat: &str, lng: &str) {
        let mut profiles = self.profiles.lock().unwrap();
        for profile in profiles
            .iter_mut()
            .filter(|p| p.user_id == Some(user_id) && p.seller_type == seller_type)
        {
            profile.latitude = Some(dec(lat));
            profile.longitude = Some(dec(lng));
        }
    }

    pub fn set_delivery_radius(&self, user_id: Uuid, seller_type: SellerType, radius_km: i32) {
        let mut profiles = self.profiles.lock().unwrap();
        for profile in profiles
            .iter_mut()
            .filter(|p| p.user_id == Some(user_id) && p.seller_type == seller_type)
        {
            profile.delivery_radius_km = radius_km;
        }
    }

    fn find(&self, user_id: Uuid, seller_type: SellerType) -> Option<SellerProfile> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == Some(user_id) && p.seller_type == seller_type)
            .cloned()
    }
}

#[async_trait]
impl SellerDirectory for InMemorySellerDirectory {
    async fn get_by_user_id(
        &self,
        user_id: Uuid,
        seller_type: SellerType,
    ) -> AppResult<Option<SellerProfile>> {
        self.profile_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_users.lock().unwrap().contains(&user_id) {
            return Err(AppError::Internal("Simulated directory failure".into()));
        }
        Ok(self.find(user_id, seller_type))
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<(Uuid, SellerType)>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.business_slug == slug)
            .and_then(|p| p.user_id.map(|user_id| (user_id, p.seller_type))))
    }

    async fn get_many(&self, keys: &[(Uuid, SellerType)]) -> AppResult<Vec<SellerProfile>> {
        self.batch_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(keys
            .iter()
            .filter_map(|(user_id, seller_type)| self.find(*user_id, *seller_type))
            .collect())
    }

    async fn list(&self, seller_type: SellerType) -> AppResult<Vec<SellerProfile>> {
        let mut profiles: Vec<SellerProfile> = self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.seller_type == seller_type)
            .cloned()
            .collect();
        profiles.sort_by_key(|p| p.id);
        Ok(profiles)
    }
}

// ============================================================================
// In-memory product catalog
// ============================================================================

#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: Mutex<Vec<Product>>,
    pub find_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products.lock().unwrap().push(product);
    }

    pub fn get(&self, product_id: Uuid) -> Product {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .expect("product not found")
    }

    pub fn all(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }
}

/// The coarse store-side predicate: availability and snapshot presence only.
/// Everything else deliberately over-returns so the tests prove the search
/// engine's in-memory pipeline is authoritative.
fn coarse_match(product: &Product, filter: &ProductFilter) -> bool {
    if filter.searchable_only && !product.is_searchable() {
        return false;
    }
    match filter.with_snapshot {
        Some(true) => product.seller_latitude.is_some() && product.seller_longitude.is_some(),
        Some(false) => product.seller_latitude.is_none() || product.seller_longitude.is_none(),
        None => true,
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_matching(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| coarse_match(p, filter))
            .cloned()
            .collect())
    }

    async fn count_matching(&self, filter: &ProductFilter) -> AppResult<i64> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| coarse_match(p, filter))
            .count() as i64)
    }

    async fn bulk_update_location(
        &self,
        seller_id: Uuid,
        seller_type: SellerType,
        snapshot: &LocationSnapshot,
    ) -> AppResult<u64> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut products = self.products.lock().unwrap();
        let mut affected = 0;
        for product in products
            .iter_mut()
            .filter(|p| p.seller_id == seller_id && p.seller_type == seller_type)
        {
            product.seller_latitude = Some(snapshot.latitude);
            product.seller_longitude = Some(snapshot.longitude);
            product.seller_address = snapshot.address.clone();
            product.seller_delivery_radius_km = Some(snapshot.delivery_radius_km);
            affected += 1;
        }
        Ok(affected)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn farmer_profile(user_id: Uuid, lat: &str, lng: &str, delivery_radius_km: i32) -> SellerProfile {
    SellerProfile {
        id: Uuid::new_v4(),
        user_id: Some(user_id),
        seller_type: SellerType::Farmer,
        display_name: "Green Valley Farm".to_string(),
        business_slug: format!("farm-{}", user_id.as_simple()),
        latitude: Some(dec(lat)),
        longitude: Some(dec(lng)),
        address: Some("4560 River Rd, Delta, BC".to_string()),
        delivery_radius_km,
        delivery_days: vec![DeliveryDay::Tuesday, DeliveryDay::Saturday],
        pickup_locations: Vec::new(),
        average_rating: dec("4.50"),
        total_reviews: 12,
    }
}

pub fn retailer_profile(
    user_id: Uuid,
    lat: &str,
    lng: &str,
    delivery_radius_km: i32,
) -> SellerProfile {
    SellerProfile {
        id: Uuid::new_v4(),
        user_id: Some(user_id),
        seller_type: SellerType::Retailer,
        display_name: "Corner Grocer".to_string(),
        business_slug: format!("grocer-{}", user_id.as_simple()),
        latitude: Some(dec(lat)),
        longitude: Some(dec(lng)),
        address: Some("200 Main St, Vancouver, BC".to_string()),
        delivery_radius_km,
        delivery_days: vec![DeliveryDay::Monday],
        pickup_locations: Vec::new(),
        average_rating: dec("4.10"),
        total_reviews: 40,
    }
}

/// A sellable product whose snapshot is copied from the given profile, as
/// product creation does
pub fn product_for(seller: &SellerProfile, name: &str, price: &str) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{} from a local seller", name),
        category: ProductCategory::Vegetables,
        status: ProductStatus::Active,
        price: dec(price),
        quantity: 100,
        unit: UnitType::Kg,
        tags: vec!["local".to_string()],
        certifications: Vec::new(),
        condition: ProductCondition::Fresh,
        seller_id: seller.user_id.expect("fixture seller has a user"),
        seller_type: seller.seller_type,
        business_name: Some(seller.display_name.clone()),
        origin: ProductOrigin::Local,
        is_available: true,
        pickup_only: false,
        average_rating: dec("4.00"),
        review_count: 3,
        sales_count: 10,
        slug: format!(
            "{}-{}",
            name.to_lowercase().replace(' ', "-"),
            Uuid::new_v4().as_simple()
        ),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
        seller_latitude: seller.latitude,
        seller_longitude: seller.longitude,
        seller_address: seller.address.clone(),
        seller_delivery_radius_km: Some(seller.delivery_radius_km),
    }
}

/// A search request with every optional filter off
pub fn base_query(latitude: f64, longitude: f64) -> SearchQuery {
    SearchQuery {
        latitude,
        longitude,
        radius_km: 50.0,
        query: None,
        category: None,
        certifications: Vec::new(),
        condition: None,
        origin: None,
        seller_type: None,
        min_price: None,
        max_price: None,
        min_rating: None,
        delivery_available: false,
        pickup_only: None,
        sort_by: SortBy::Distance,
        page: 1,
        limit: 20,
    }
}
