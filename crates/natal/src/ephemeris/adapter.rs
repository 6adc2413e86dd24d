use crate::bodies::Body;
use crate::ephemeris::types::{GeoPosition, RawPositions};
use crate::houses::HouseSystem;
use crate::time::Instant;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Julian day {julian_day} is outside the supported range {min}..{max}")]
    OutOfRange { julian_day: f64, min: f64, max: f64 },
    #[error("Location {latitude}, {longitude} is not supported: {message}")]
    InvalidLocation {
        latitude: f64,
        longitude: f64,
        message: String,
    },
    #[error("Failed to calculate position for {body}: {message}")]
    CalculationFailed { body: String, message: String },
    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },
    #[error("Invalid position table: {message}")]
    InvalidTable { message: String },
}

/// Source of raw planetary and ascendant longitudes.
///
/// Implementations fail instead of returning partial garbage: an instant or
/// location outside the provider's range is an error. A body the provider
/// simply does not know may be left out of `RawPositions::bodies`.
pub trait EphemerisAdapter: Send + Sync {
    fn positions(
        &self,
        instant: &Instant,
        location: &GeoPosition,
        house_system: HouseSystem,
        bodies: &[Body],
    ) -> Result<RawPositions, EphemerisError>;
}

/// Reject non-finite longitudes and out-of-range house data.
pub fn validate_positions(raw: &RawPositions) -> Result<(), EphemerisError> {
    if !raw.ascendant.is_finite() {
        return Err(EphemerisError::CalculationFailed {
            body: "asc".to_string(),
            message: "non-finite ascendant".to_string(),
        });
    }
    if let Some((body, _)) = raw.bodies.iter().find(|(_, lon)| !lon.is_finite()) {
        return Err(EphemerisError::CalculationFailed {
            body: body.to_string(),
            message: "non-finite longitude".to_string(),
        });
    }
    if let Some(houses) = &raw.body_houses {
        if let Some((body, house)) = houses.iter().find(|(_, h)| !(1..=12).contains(*h)) {
            return Err(EphemerisError::HouseCalculationFailed {
                message: format!("{body} placed in house {house}"),
            });
        }
    }
    if let Some(cusps) = &raw.cusps {
        if cusps.iter().any(|c| !c.is_finite()) {
            return Err(EphemerisError::HouseCalculationFailed {
                message: "non-finite house cusp".to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    valid_from_jd: Option<f64>,
    #[serde(default)]
    valid_to_jd: Option<f64>,
    #[serde(flatten)]
    positions: RawPositions,
}

/// Replays a fixed set of positions, e.g. precomputed by an external
/// ephemeris service and stored as JSON.
///
/// An optional Julian Day window limits the instants the table answers for.
#[derive(Debug, Clone)]
pub struct TableEphemeris {
    positions: RawPositions,
    valid_jd: Option<(f64, f64)>,
}

impl TableEphemeris {
    pub fn new(positions: RawPositions) -> Self {
        Self {
            positions,
            valid_jd: None,
        }
    }

    pub fn valid_between(mut self, from_jd: f64, to_jd: f64) -> Self {
        self.valid_jd = Some((from_jd, to_jd));
        self
    }

    /// Parse a JSON table:
    /// `{"ascendant": 15.0, "bodies": {"sun": 100.0}, "valid_from_jd": ..., "valid_to_jd": ...}`
    pub fn from_json(text: &str) -> Result<Self, EphemerisError> {
        let file: TableFile =
            serde_json::from_str(text).map_err(|e| EphemerisError::InvalidTable {
                message: e.to_string(),
            })?;
        validate_positions(&file.positions)?;
        let table = Self::new(file.positions);
        Ok(match (file.valid_from_jd, file.valid_to_jd) {
            (Some(from), Some(to)) => table.valid_between(from, to),
            (Some(from), None) => table.valid_between(from, f64::INFINITY),
            (None, Some(to)) => table.valid_between(f64::NEG_INFINITY, to),
            (None, None) => table,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, EphemerisError> {
        let text = std::fs::read_to_string(path).map_err(|e| EphemerisError::FileNotFound {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }
}

impl EphemerisAdapter for TableEphemeris {
    fn positions(
        &self,
        instant: &Instant,
        _location: &GeoPosition,
        house_system: HouseSystem,
        bodies: &[Body],
    ) -> Result<RawPositions, EphemerisError> {
        if let Some((min, max)) = self.valid_jd {
            if !(min..=max).contains(&instant.julian_day) {
                return Err(EphemerisError::OutOfRange {
                    julian_day: instant.julian_day,
                    min,
                    max,
                });
            }
        }

        validate_positions(&self.positions)?;

        let mut raw = self.positions.clone();
        raw.bodies.retain(|body, _| bodies.contains(body));
        if let Some(houses) = raw.body_houses.as_mut() {
            houses.retain(|body, _| bodies.contains(body));
        }
        if house_system.is_whole_sign() {
            raw.body_houses = None;
            raw.cusps = None;
        }
        Ok(raw)
    }
}
