//! Seller profile models
//!
//! A seller is either a farmer or a retailer. Both variants own the canonical
//! copy of their location data; products carry only a cached snapshot of it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DeliveryDay, GeoPoint, PickupLocation};

/// The two kinds of seller on the platform.
///
/// Matched exhaustively in the sync and enrichment paths so that adding a
/// third seller kind is a compile-time-checked change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SellerType {
    Farmer,
    Retailer,
}

impl SellerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerType::Farmer => "farmer",
            SellerType::Retailer => "retailer",
        }
    }
}

impl std::str::FromStr for SellerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(SellerType::Farmer),
            "retailer" => Ok(SellerType::Retailer),
            other => Err(format!("Unknown seller type: {}", other)),
        }
    }
}

impl std::fmt::Display for SellerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical seller profile, unified over the farmer and retailer tables.
///
/// `location`, `address` and `delivery_radius_km` are the source of truth for
/// the snapshot cached on each of the seller's products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerProfile {
    pub id: Uuid,
    /// Owning user account; profiles without one are skipped by batch sync
    pub user_id: Option<Uuid>,
    pub seller_type: SellerType,
    /// Farm name or retail business name
    pub display_name: String,
    pub business_slug: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub address: Option<String>,
    pub delivery_radius_km: i32,
    pub delivery_days: Vec<DeliveryDay>,
    pub pickup_locations: Vec<PickupLocation>,
    pub average_rating: Decimal,
    pub total_reviews: i32,
}

impl SellerProfile {
    /// Canonical coordinates as a math-ready point, when present and valid
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_decimals(self.latitude, self.longitude)
    }

    /// The snapshot this profile projects onto its products, or `None` when
    /// the profile has no usable coordinates.
    pub fn location_snapshot(&self) -> Option<LocationSnapshot> {
        self.location()?;
        Some(LocationSnapshot {
            latitude: self.latitude?,
            longitude: self.longitude?,
            address: self.address.clone(),
            delivery_radius_km: self.delivery_radius_km,
        })
    }
}

/// The denormalized location fields copied onto every product a seller owns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationSnapshot {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub address: Option<String>,
    pub delivery_radius_km: i32,
}

/// Emitted by profile-management flows after a seller's coordinates change.
///
/// The sync engine consumes this instead of relying on inline sync calls
/// scattered across profile-update code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SellerLocationChanged {
    pub seller_id: Uuid,
    pub seller_type: SellerType,
}
