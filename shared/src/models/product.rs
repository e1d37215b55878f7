//! Product model and attribute enums

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::SellerType;
use crate::types::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Vegetables,
    Fruits,
    Herbs,
    Mushrooms,
    Dairy,
    Meat,
    Poultry,
    Seafood,
    Eggs,
    Grains,
    Legumes,
    Nuts,
    Seeds,
    BakedGoods,
    Preserves,
    JamsJellies,
    Pickles,
    Sauces,
    Cheese,
    Yogurt,
    Juice,
    Milk,
    Tea,
    Coffee,
    Honey,
    MapleSyrup,
    Oils,
    Vinegar,
    ReadyToEat,
    Frozen,
    Dried,
    Flowers,
    Plants,
    Other,
}

/// Publication status of a product listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Active,
    OutOfStock,
    LowStock,
    Discontinued,
    Seasonal,
    PendingApproval,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CertificationType {
    Organic,
    CertifiedOrganic,
    NonGmo,
    PesticideFree,
    ChemicalFree,
    GrassFed,
    PastureRaised,
    FreeRange,
    CageFree,
    HumanelyRaised,
    NoAntibiotics,
    NoHormones,
    Halal,
    Kosher,
    LocallyGrown,
    FairTrade,
    Sustainable,
    Regenerative,
    Biodynamic,
    FoodSafetyCertified,
    GlutenFree,
    Vegan,
    Vegetarian,
    DairyFree,
    NutFree,
    Heirloom,
    WildCaught,
    FarmRaised,
    Handmade,
    SmallBatch,
}

/// Physical condition of the produce; imperfect items sell at a discount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    Fresh,
    Excellent,
    Good,
    Fair,
    Imperfect,
    SlightlyDamaged,
    Overripe,
    NearExpiry,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductOrigin {
    Local,
    Regional,
    National,
    Imported,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Kg,
    Gram,
    Lb,
    Liter,
    Milliliter,
    Piece,
    Dozen,
    Bunch,
    Bag,
    Box,
    Jar,
    Bottle,
}

/// A product listing.
///
/// The `seller_*` fields are a cached snapshot of the owning seller's
/// canonical location data, populated at creation and refreshed only by the
/// location sync engine. Between a profile update and the next sync the
/// snapshot may be stale; that window is accepted by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub status: ProductStatus,
    pub price: Decimal,
    pub quantity: i32,
    pub unit: UnitType,
    pub tags: Vec<String>,
    pub certifications: Vec<CertificationType>,
    pub condition: ProductCondition,
    pub seller_id: Uuid,
    pub seller_type: SellerType,
    /// Farm or business name, cached for display
    pub business_name: Option<String>,
    pub origin: ProductOrigin,
    pub is_available: bool,
    pub pickup_only: bool,
    pub average_rating: Decimal,
    pub review_count: i32,
    pub sales_count: i32,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,

    // Cached seller location snapshot
    pub seller_latitude: Option<Decimal>,
    pub seller_longitude: Option<Decimal>,
    pub seller_address: Option<String>,
    pub seller_delivery_radius_km: Option<i32>,
}

impl Product {
    /// The cached snapshot coordinates as a math-ready point.
    ///
    /// `None` means the product has never been synced and is excluded from
    /// location-based search.
    pub fn cached_point(&self) -> Option<GeoPoint> {
        GeoPoint::from_decimals(self.seller_latitude, self.seller_longitude)
    }

    /// Whether the product can appear in search results at all
    pub fn is_searchable(&self) -> bool {
        self.status == ProductStatus::Active && self.is_available && self.deleted_at.is_none()
    }
}
