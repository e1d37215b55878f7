//! Great-circle distance math
//!
//! This module is the single distance implementation for the platform: the
//! search radius filter, delivery-availability checks, and any other feature
//! that measures distance between coordinates must call [`distance_km`]
//! rather than carrying its own formula.

use crate::types::GeoPoint;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Great-circle distance between two points using the haversine formula.
///
/// Symmetric and non-negative for all validated points.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = to_radians(a.latitude);
    let lat2 = to_radians(b.latitude);
    let dlat = to_radians(b.latitude - a.latitude);
    let dlon = to_radians(b.longitude - a.longitude);

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Axis-aligned bounding box around `center` that fully contains the circle
/// of `radius_km`.
///
/// Used as a cheap store-side pre-filter; it may over-cover (notably near the
/// poles, where it widens to the full longitude range) but never under-cover,
/// so the precise haversine filter downstream stays authoritative.
pub fn bounding_box(center: &GeoPoint, radius_km: f64) -> ((f64, f64), (f64, f64)) {
    let lat_delta = to_degrees(radius_km / EARTH_RADIUS_KM);
    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    let cos_lat = to_radians(center.latitude).cos();
    let (min_lon, max_lon) = if cos_lat <= f64::EPSILON {
        (-180.0, 180.0)
    } else {
        let lon_delta = to_degrees(radius_km / (EARTH_RADIUS_KM * cos_lat));
        (
            (center.longitude - lon_delta).max(-180.0),
            (center.longitude + lon_delta).min(180.0),
        )
    };

    ((min_lat, min_lon), (max_lat, max_lon))
}
