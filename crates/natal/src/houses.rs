//! House assignment.
//!
//! A chart picks one [`HouseSystem`] and every point in it, lots included,
//! is housed through the single [`HouseStrategy`] that system produces.

use crate::bodies::ChartPoint;
use crate::ephemeris::RawPositions;
use crate::error::PointError;
use crate::zodiac::{normalize_longitude, sign_index};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quadrant systems whose cusps come from the ephemeris.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuadrantSystem {
    Placidus,
    Koch,
    Regiomontanus,
    Campanus,
    Alcabitius,
    Morinus,
    Equal,
}

impl QuadrantSystem {
    pub const ALL: [QuadrantSystem; 7] = [
        QuadrantSystem::Placidus,
        QuadrantSystem::Koch,
        QuadrantSystem::Regiomontanus,
        QuadrantSystem::Campanus,
        QuadrantSystem::Alcabitius,
        QuadrantSystem::Morinus,
        QuadrantSystem::Equal,
    ];

    /// Config name
    pub fn name(self) -> &'static str {
        match self {
            QuadrantSystem::Placidus => "placidus",
            QuadrantSystem::Koch => "koch",
            QuadrantSystem::Regiomontanus => "regiomontanus",
            QuadrantSystem::Campanus => "campanus",
            QuadrantSystem::Alcabitius => "alcabitius",
            QuadrantSystem::Morinus => "morinus",
            QuadrantSystem::Equal => "equal",
        }
    }

    /// Swiss Ephemeris house system code
    pub fn swiss_code(self) -> u8 {
        match self {
            QuadrantSystem::Placidus => b'P',
            QuadrantSystem::Koch => b'K',
            QuadrantSystem::Regiomontanus => b'R',
            QuadrantSystem::Campanus => b'C',
            QuadrantSystem::Alcabitius => b'A',
            QuadrantSystem::Morinus => b'M',
            QuadrantSystem::Equal => b'E',
        }
    }
}

const WHOLE_SIGN: &str = "whole_sign";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HouseSystem {
    #[default]
    WholeSign,
    Quadrant(QuadrantSystem),
}

impl HouseSystem {
    pub fn is_whole_sign(self) -> bool {
        matches!(self, HouseSystem::WholeSign)
    }

    pub fn name(self) -> &'static str {
        match self {
            HouseSystem::WholeSign => WHOLE_SIGN,
            HouseSystem::Quadrant(q) => q.name(),
        }
    }

    /// Single-letter house system code understood by the Swiss Ephemeris.
    pub fn swiss_code(self) -> u8 {
        match self {
            HouseSystem::WholeSign => b'W',
            HouseSystem::Quadrant(q) => q.swiss_code(),
        }
    }

    /// Build the strategy used for every point of one chart.
    pub fn strategy<'a>(self, ascendant: f64, raw: &'a RawPositions) -> Box<dyn HouseStrategy + 'a> {
        match self {
            HouseSystem::WholeSign => Box::new(WholeSignHouses::new(ascendant)),
            HouseSystem::Quadrant(system) => Box::new(QuadrantHouses { system, raw }),
        }
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid house system: {system}. Valid systems: {valid:?}")]
pub struct InvalidHouseSystem {
    pub system: String,
    pub valid: Vec<String>,
}

impl FromStr for HouseSystem {
    type Err = InvalidHouseSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase().replace(['-', ' '], "_");
        if lower == WHOLE_SIGN {
            return Ok(HouseSystem::WholeSign);
        }
        QuadrantSystem::ALL
            .iter()
            .find(|system| system.name() == lower)
            .map(|system| HouseSystem::Quadrant(*system))
            .ok_or_else(|| InvalidHouseSystem {
                system: s.to_string(),
                valid: std::iter::once(WHOLE_SIGN)
                    .chain(QuadrantSystem::ALL.iter().map(|system| system.name()))
                    .map(str::to_string)
                    .collect(),
            })
    }
}

impl TryFrom<String> for HouseSystem {
    type Error = InvalidHouseSystem;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HouseSystem> for String {
    fn from(system: HouseSystem) -> Self {
        system.name().to_string()
    }
}

/// Assigns a house number 1..=12 to a chart point.
pub trait HouseStrategy {
    fn system(&self) -> HouseSystem;

    fn house_of(&self, point: ChartPoint, longitude: f64) -> Result<u8, PointError>;
}

/// Whole-sign house of a body, given both sign indices (0 = Aries).
pub fn whole_sign_house(ascendant_sign: usize, body_sign: usize) -> u8 {
    let asc = (ascendant_sign % 12) as i64;
    let body = (body_sign % 12) as i64;
    ((body - asc).rem_euclid(12) + 1) as u8
}

/// Each house spans exactly one sign, house 1 being the ascendant's sign.
#[derive(Debug, Clone, Copy)]
pub struct WholeSignHouses {
    ascendant_sign: usize,
}

impl WholeSignHouses {
    pub fn new(ascendant: f64) -> Self {
        Self {
            ascendant_sign: sign_index(ascendant),
        }
    }
}

impl HouseStrategy for WholeSignHouses {
    fn system(&self) -> HouseSystem {
        HouseSystem::WholeSign
    }

    fn house_of(&self, _point: ChartPoint, longitude: f64) -> Result<u8, PointError> {
        Ok(whole_sign_house(self.ascendant_sign, sign_index(longitude)))
    }
}

/// House containing `longitude` given the twelve cusps of houses 1..12.
///
/// House `i` spans `[cusp_i, cusp_{i+1})` going forward around the circle.
/// Returns `None` when the cusps are degenerate.
pub fn house_from_cusps(cusps: &[f64; 12], longitude: f64) -> Option<u8> {
    let lon = normalize_longitude(longitude);
    (0..12).find_map(|i| {
        let start = normalize_longitude(cusps[i]);
        let span = normalize_longitude(cusps[(i + 1) % 12] - start);
        let offset = normalize_longitude(lon - start);
        (span > 0.0 && offset < span).then_some((i + 1) as u8)
    })
}

/// Quadrant houses as reported by the ephemeris: per-body house numbers
/// first, otherwise the cusp table.
pub struct QuadrantHouses<'a> {
    system: QuadrantSystem,
    raw: &'a RawPositions,
}

impl HouseStrategy for QuadrantHouses<'_> {
    fn system(&self) -> HouseSystem {
        HouseSystem::Quadrant(self.system)
    }

    fn house_of(&self, point: ChartPoint, longitude: f64) -> Result<u8, PointError> {
        if point == ChartPoint::Ascendant {
            return Ok(1);
        }
        if let ChartPoint::Body(body) = point {
            if let Some(house) = self.raw.house_of(body) {
                if !(1..=12).contains(&house) {
                    return Err(PointError::HouseUnavailable { point });
                }
                return Ok(house);
            }
        }
        self.raw
            .cusps
            .as_ref()
            .and_then(|cusps| house_from_cusps(cusps, longitude))
            .ok_or(PointError::HouseUnavailable { point })
    }
}
