//! Place-name and timezone collaborators.

use crate::ephemeris::GeoPosition;
use crate::time::TimezoneId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Resolves a free-form place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, place: &str) -> Option<GeoPosition>;
}

/// Resolves coordinates to a timezone identifier.
#[async_trait]
pub trait TimezoneLookup: Send + Sync {
    async fn zone_at(&self, position: GeoPosition) -> Option<TimezoneId>;
}

/// A named place with its timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub zone: TimezoneId,
}

/// Maximum distance in degrees between a queried position and a known place
/// for the place's zone to apply.
pub const DEFAULT_ZONE_TOLERANCE: f64 = 0.5;

/// Geocoder and timezone lookup over a fixed list of places.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: Vec<Place>,
    zone_tolerance: f64,
}

fn place_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Gazetteer {
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            places,
            zone_tolerance: DEFAULT_ZONE_TOLERANCE,
        }
    }

    pub fn with_zone_tolerance(mut self, degrees: f64) -> Self {
        self.zone_tolerance = degrees;
        self
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn find(&self, name: &str) -> Option<&Place> {
        let key = place_key(name);
        self.places.iter().find(|p| place_key(&p.name) == key)
    }

    /// Closest place within the zone tolerance.
    pub fn nearest(&self, position: GeoPosition) -> Option<&Place> {
        self.places
            .iter()
            .map(|p| {
                let d_lat = p.latitude - position.latitude;
                let d_lon = (p.longitude - position.longitude).abs();
                let d_lon = d_lon.min(360.0 - d_lon);
                (p, d_lat.hypot(d_lon))
            })
            .filter(|(_, d)| *d <= self.zone_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }
}

#[async_trait]
impl Geocoder for Gazetteer {
    async fn resolve(&self, place: &str) -> Option<GeoPosition> {
        let found = self.find(place)?;
        match GeoPosition::new(found.latitude, found.longitude) {
            Ok(position) => Some(position),
            Err(e) => {
                log::warn!("gazetteer entry {:?} is unusable: {e}", found.name);
                None
            }
        }
    }
}

#[async_trait]
impl TimezoneLookup for Gazetteer {
    async fn zone_at(&self, position: GeoPosition) -> Option<TimezoneId> {
        self.nearest(position).map(|p| p.zone.clone())
    }
}

/// Answers every position with the same zone.
#[derive(Debug, Clone)]
pub struct FixedZoneLookup(pub TimezoneId);

#[async_trait]
impl TimezoneLookup for FixedZoneLookup {
    async fn zone_at(&self, _position: GeoPosition) -> Option<TimezoneId> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gazetteer() -> Gazetteer {
        Gazetteer::new(vec![
            Place {
                name: "London".to_string(),
                latitude: 51.5074,
                longitude: -0.1278,
                zone: TimezoneId::new("UTC"),
            },
            Place {
                name: "New Delhi".to_string(),
                latitude: 28.6139,
                longitude: 77.2090,
                zone: TimezoneId::new("UTC+05:30"),
            },
        ])
    }

    #[tokio::test]
    async fn test_resolve_ignores_case_and_spacing() {
        let g = gazetteer();
        let pos = g.resolve("  new   DELHI ").await.unwrap();
        assert_eq!(pos.latitude, 28.6139);
        assert!(g.resolve("Atlantis").await.is_none());
    }

    #[tokio::test]
    async fn test_zone_at_nearest_place() {
        let g = gazetteer();
        let near_delhi = GeoPosition::new(28.7, 77.1).unwrap();
        assert_eq!(g.zone_at(near_delhi).await, Some(TimezoneId::new("UTC+05:30")));
        let mid_ocean = GeoPosition::new(-40.0, -140.0).unwrap();
        assert_eq!(g.zone_at(mid_ocean).await, None);
    }

    #[tokio::test]
    async fn test_fixed_zone_lookup() {
        let lookup = FixedZoneLookup(TimezoneId::new("UTC-03:00"));
        let pos = GeoPosition::new(0.0, 0.0).unwrap();
        assert_eq!(lookup.zone_at(pos).await.unwrap().as_str(), "UTC-03:00");
    }
}
