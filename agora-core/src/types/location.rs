//! Geographic location type.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_LATITUDE, MAX_LONGITUDE};
use crate::error::{AgoraError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// LOCATION
// ═══════════════════════════════════════════════════════════════════════════════

/// A geocoded location: coordinates plus the display name the geocoding
/// service reported for them.
///
/// This is what event venues on the map are pinned to.
///
/// # Example
/// ```
/// use agora_core::Location;
///
/// let loc = Location::new(46.5191, 6.5668, "EPFL, Lausanne");
/// assert!(loc.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Human-readable name
    pub name: String,
}

impl Location {
    /// Creates a new location.
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
        }
    }

    /// Checks that the coordinates are finite and inside WGS84 bounds.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || self.latitude.abs() > MAX_LATITUDE {
            return Err(AgoraError::ValidationError(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > MAX_LONGITUDE {
            return Err(AgoraError::ValidationError(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.5}, {:.5})", self.name, self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_location_json_roundtrip() {
        let loc = Location::new(-1.0, 1.0, "some location");
        let json = serde_json::to_string(&loc).unwrap();
        let parsed: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, loc);
    }

    #[test_case(0.0, 0.0 => true ; "origin")]
    #[test_case(90.0, 180.0 => true ; "upper bounds inclusive")]
    #[test_case(-90.0, -180.0 => true ; "lower bounds inclusive")]
    #[test_case(90.5, 0.0 => false ; "latitude too large")]
    #[test_case(0.0, -180.1 => false ; "longitude too small")]
    #[test_case(f64::NAN, 0.0 => false ; "nan latitude")]
    fn test_validate(lat: f64, lon: f64) -> bool {
        Location::new(lat, lon, "x").validate().is_ok()
    }

    #[test]
    fn test_display() {
        let loc = Location::new(1.5, -2.25, "Rolex Learning Center");
        assert_eq!(loc.to_string(), "Rolex Learning Center (1.50000, -2.25000)");
    }
}
