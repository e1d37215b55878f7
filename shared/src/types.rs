//! Common types used across the platform

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::validate_coordinates;

/// A validated geographic coordinate pair.
///
/// Construction goes through [`GeoPoint::new`], which rejects non-finite and
/// out-of-range values, so downstream distance math never sees NaN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, &'static str> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point from the fixed-point decimals used at rest.
    ///
    /// Returns `None` when either coordinate is missing or does not convert
    /// to a valid in-range value.
    pub fn from_decimals(latitude: Option<Decimal>, longitude: Option<Decimal>) -> Option<Self> {
        let lat = latitude?.to_f64()?;
        let lng = longitude?.to_f64()?;
        Self::new(lat, lng).ok()
    }
}

/// Days of the week a seller delivers or offers pickup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A pickup point published by a seller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickupLocation {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub available_days: Vec<DeliveryDay>,
    pub hours: String,
}
