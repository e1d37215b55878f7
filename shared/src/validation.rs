//! Validation utilities for the Harvest Market platform
//!
//! Pure checks shared by the HTTP layer and the engines. Search input bounds
//! are client-error territory: out-of-range values are rejected outright,
//! never clamped.

use rust_decimal::Decimal;

/// Search radius bounds in kilometers
pub const MIN_SEARCH_RADIUS_KM: f64 = 1.0;
pub const MAX_SEARCH_RADIUS_KM: f64 = 500.0;

/// Page size bounds for search results
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// Geographic Validations
// ============================================================================

/// Validate a latitude/longitude pair
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err("Coordinates must be finite numbers");
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a search radius in kilometers
pub fn validate_search_radius(radius_km: f64) -> Result<(), &'static str> {
    if !radius_km.is_finite() {
        return Err("Search radius must be a finite number");
    }
    if !(MIN_SEARCH_RADIUS_KM..=MAX_SEARCH_RADIUS_KM).contains(&radius_km) {
        return Err("Search radius must be between 1 and 500 km");
    }
    Ok(())
}

/// Validate a delivery radius in kilometers (seller profile setting)
pub fn validate_delivery_radius(radius_km: i32) -> Result<(), &'static str> {
    if radius_km < 0 {
        return Err("Delivery radius cannot be negative");
    }
    if radius_km > 1000 {
        return Err("Delivery radius exceeds maximum of 1000 km");
    }
    Ok(())
}

// ============================================================================
// Search Input Validations
// ============================================================================

/// Validate pagination parameters
pub fn validate_pagination(page: u32, limit: u32) -> Result<(), &'static str> {
    if page < 1 {
        return Err("Page must be at least 1");
    }
    if limit < MIN_PAGE_SIZE {
        return Err("Limit must be at least 1");
    }
    if limit > MAX_PAGE_SIZE {
        return Err("Limit must be at most 100");
    }
    Ok(())
}

/// Validate a minimum-rating filter (1-5 scale)
pub fn validate_min_rating(rating: Decimal) -> Result<(), &'static str> {
    if rating < Decimal::ONE || rating > Decimal::from(5) {
        return Err("Minimum rating must be between 1 and 5");
    }
    Ok(())
}

/// Validate a price range filter
pub fn validate_price_range(
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
) -> Result<(), &'static str> {
    if let Some(min) = min_price {
        if min < Decimal::ZERO {
            return Err("Minimum price cannot be negative");
        }
    }
    if let Some(max) = max_price {
        if max < Decimal::ZERO {
            return Err("Maximum price cannot be negative");
        }
    }
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err("Minimum price cannot exceed maximum price");
        }
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate business slug format (3-63 lowercase alphanumeric and hyphens,
/// no leading/trailing hyphen)
pub fn validate_business_slug(slug: &str) -> Result<(), &'static str> {
    if slug.len() < 3 {
        return Err("Business slug must be at least 3 characters");
    }
    if slug.len() > 63 {
        return Err("Business slug must be at most 63 characters");
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Business slug must contain only lowercase letters, numbers, and hyphens");
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("Business slug cannot start or end with a hyphen");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Geographic Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_coordinates_valid() {
        assert!(validate_coordinates(49.2827, -123.1207).is_ok());
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
        assert!(validate_coordinates(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_validate_coordinates_out_of_range() {
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(-90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, 180.1).is_err());
        assert!(validate_coordinates(0.0, -180.1).is_err());
    }

    #[test]
    fn test_validate_coordinates_non_finite() {
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::NAN).is_err());
        assert!(validate_coordinates(f64::INFINITY, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_search_radius_valid() {
        assert!(validate_search_radius(1.0).is_ok());
        assert!(validate_search_radius(50.0).is_ok());
        assert!(validate_search_radius(500.0).is_ok());
    }

    #[test]
    fn test_validate_search_radius_invalid() {
        assert!(validate_search_radius(0.0).is_err());
        assert!(validate_search_radius(0.9).is_err());
        assert!(validate_search_radius(500.1).is_err());
        assert!(validate_search_radius(-10.0).is_err());
        assert!(validate_search_radius(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_delivery_radius() {
        assert!(validate_delivery_radius(0).is_ok());
        assert!(validate_delivery_radius(25).is_ok());
        assert!(validate_delivery_radius(1000).is_ok());
        assert!(validate_delivery_radius(-1).is_err());
        assert!(validate_delivery_radius(1001).is_err());
    }

    // ========================================================================
    // Search Input Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_pagination_valid() {
        assert!(validate_pagination(1, 1).is_ok());
        assert!(validate_pagination(1, 20).is_ok());
        assert!(validate_pagination(100, 100).is_ok());
    }

    #[test]
    fn test_validate_pagination_invalid() {
        assert!(validate_pagination(0, 20).is_err());
        assert!(validate_pagination(1, 0).is_err());
        assert!(validate_pagination(1, 101).is_err());
    }

    #[test]
    fn test_validate_min_rating() {
        assert!(validate_min_rating(Decimal::ONE).is_ok());
        assert!(validate_min_rating(Decimal::from(4)).is_ok());
        assert!(validate_min_rating(Decimal::from(5)).is_ok());
        assert!(validate_min_rating(Decimal::ZERO).is_err());
        assert!(validate_min_rating(Decimal::from(6)).is_err());
    }

    #[test]
    fn test_validate_price_range_valid() {
        assert!(validate_price_range(None, None).is_ok());
        assert!(validate_price_range(Some(Decimal::ZERO), None).is_ok());
        assert!(validate_price_range(Some(Decimal::from(5)), Some(Decimal::from(10))).is_ok());
        assert!(validate_price_range(Some(Decimal::from(5)), Some(Decimal::from(5))).is_ok());
    }

    #[test]
    fn test_validate_price_range_invalid() {
        assert!(validate_price_range(Some(Decimal::from(-1)), None).is_err());
        assert!(validate_price_range(None, Some(Decimal::from(-1))).is_err());
        assert!(validate_price_range(Some(Decimal::from(10)), Some(Decimal::from(5))).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_business_slug_valid() {
        assert!(validate_business_slug("green-valley-farm").is_ok());
        assert!(validate_business_slug("abc").is_ok());
        assert!(validate_business_slug("farm123").is_ok());
    }

    #[test]
    fn test_validate_business_slug_invalid() {
        assert!(validate_business_slug("ab").is_err()); // Too short
        assert!(validate_business_slug(&"a".repeat(64)).is_err()); // Too long
        assert!(validate_business_slug("Green-Valley").is_err()); // Uppercase
        assert!(validate_business_slug("farm_123").is_err()); // Underscore
        assert!(validate_business_slug("-farm").is_err()); // Leading hyphen
        assert!(validate_business_slug("farm-").is_err()); // Trailing hyphen
    }
}
