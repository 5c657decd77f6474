//! Coordinate and place validation for endpoint parameters.

use owm_core::constants::{LATITUDE_RANGE, LONGITUDE_RANGE};
use owm_core::error::{OwmError, Result};

/// Checks that `lat` is a latitude in degrees.
pub fn validate_latitude(lat: f64) -> Result<()> {
    if !(LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&lat) {
        return Err(OwmError::ValidationError(format!(
            "latitude must be between -90.0 and 90.0, got {lat}"
        )));
    }
    Ok(())
}

/// Checks that `lon` is a longitude in degrees.
pub fn validate_longitude(lon: f64) -> Result<()> {
    if !(LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&lon) {
        return Err(OwmError::ValidationError(format!(
            "longitude must be between -180.0 and 180.0, got {lon}"
        )));
    }
    Ok(())
}

/// Checks both coordinates.
pub fn validate_coords(lat: f64, lon: f64) -> Result<()> {
    validate_latitude(lat)?;
    validate_longitude(lon)
}

/// Trims a place name, rejecting empty input.
pub fn normalize_place(place: &str) -> Result<&str> {
    let trimmed = place.trim();
    if trimmed.is_empty() {
        return Err(OwmError::ValidationError("place name cannot be empty".into()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, 0.0 ; "origin")]
    #[test_case(90.0, 180.0 ; "upper bounds")]
    #[test_case(-90.0, -180.0 ; "lower bounds")]
    #[test_case(51.5074, -0.1278 ; "london")]
    fn test_valid_coords(lat: f64, lon: f64) {
        assert!(validate_coords(lat, lon).is_ok());
    }

    #[test_case(90.1, 0.0 ; "lat too high")]
    #[test_case(-91.0, 0.0 ; "lat too low")]
    #[test_case(0.0, 180.5 ; "lon too high")]
    #[test_case(0.0, -200.0 ; "lon too low")]
    #[test_case(f64::NAN, 0.0 ; "lat nan")]
    #[test_case(0.0, f64::NAN ; "lon nan")]
    fn test_invalid_coords(lat: f64, lon: f64) {
        assert!(matches!(validate_coords(lat, lon), Err(OwmError::ValidationError(_))));
    }

    #[test]
    fn test_normalize_place() {
        assert_eq!(normalize_place("  London,GB ").unwrap(), "London,GB");
        assert!(normalize_place("   ").is_err());
    }
}
