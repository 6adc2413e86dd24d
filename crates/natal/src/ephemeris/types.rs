use crate::bodies::Body;
use crate::error::ChartError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ChartError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(ChartError::InvalidLocation {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Raw output of an ephemeris for one instant and location.
///
/// Longitudes are ecliptic degrees and may be outside [0, 360).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPositions {
    pub ascendant: f64,
    pub bodies: BTreeMap<Body, f64>,
    /// Per-body house numbers from a quadrant house system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_houses: Option<BTreeMap<Body, u8>>,
    /// Cusps of houses 1..12 from a quadrant house system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cusps: Option<[f64; 12]>,
}

impl RawPositions {
    pub fn new(ascendant: f64) -> Self {
        Self {
            ascendant,
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: Body, longitude: f64) -> Self {
        self.bodies.insert(body, longitude);
        self
    }

    pub fn longitude(&self, body: Body) -> Option<f64> {
        self.bodies.get(&body).copied()
    }

    pub fn house_of(&self, body: Body) -> Option<u8> {
        self.body_houses.as_ref()?.get(&body).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_position_bounds() {
        assert!(GeoPosition::new(51.48, 0.0).is_ok());
        assert!(GeoPosition::new(-90.0, 180.0).is_ok());
        assert!(GeoPosition::new(90.5, 0.0).is_err());
        assert!(GeoPosition::new(0.0, -180.1).is_err());
        assert!(GeoPosition::new(f64::NAN, 0.0).is_err());
    }
}
