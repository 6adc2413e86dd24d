use crate::bodies::{Body, ChartPoint};
use crate::ephemeris::GeoPosition;
use crate::error::PointError;
use crate::houses::HouseSystem;
use crate::time::Instant;
use crate::western::{LotFormula, Sect};
use crate::zodiac::ZodiacSign;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Outcome of one chart field. An unavailable field carries the reason and
/// leaves the rest of the chart intact.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Available(T),
    Unavailable(PointError),
}

impl<T> Field<T> {
    pub fn from_result(result: Result<T, PointError>) -> Self {
        match result {
            Ok(value) => Field::Available(value),
            Err(e) => Field::Unavailable(e),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Field::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Available(value) => Some(value),
            Field::Unavailable(_) => None,
        }
    }

    pub fn error(&self) -> Option<&PointError> {
        match self {
            Field::Available(_) => None,
            Field::Unavailable(e) => Some(e),
        }
    }

    pub fn as_result(&self) -> Result<&T, &PointError> {
        match self {
            Field::Available(value) => Ok(value),
            Field::Unavailable(e) => Err(e),
        }
    }
}

/// Available values serialize as themselves, failures as
/// `{"error": "...", "kind": "..."}`.
impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Available(value) => value.serialize(serializer),
            Field::Unavailable(e) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", &e.to_string())?;
                map.serialize_entry("kind", e.kind())?;
                map.end()
            }
        }
    }
}

/// A point resolved to sign, degree and house.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyPosition {
    #[serde(skip)]
    pub point: ChartPoint,
    /// Normalized ecliptic longitude in [0, 360)
    pub longitude: f64,
    pub sign: ZodiacSign,
    /// Degree within the sign, two decimals, in [0, 30)
    pub degree: f64,
    /// House 1..=12
    pub house: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartRuler {
    pub planet: Body,
    #[serde(flatten)]
    pub position: BodyPosition,
}

/// A complete natal chart. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NatalChart {
    pub instant: Instant,
    pub location: GeoPosition,
    pub house_system: HouseSystem,
    pub lot_formula: LotFormula,
    pub ascendant: BodyPosition,
    pub planets: BTreeMap<Body, Field<BodyPosition>>,
    pub sect: Field<Sect>,
    pub lot_of_fortune: Field<BodyPosition>,
    pub lot_of_spirit: Field<BodyPosition>,
    pub chart_ruler: Field<ChartRuler>,
}

impl NatalChart {
    pub fn planet(&self, body: Body) -> Option<&BodyPosition> {
        self.planets.get(&body).and_then(Field::value)
    }

    /// Every unavailable field with its name.
    pub fn failures(&self) -> Vec<(String, &PointError)> {
        let mut failures: Vec<(String, &PointError)> = self
            .planets
            .iter()
            .filter_map(|(body, field)| field.error().map(|e| (body.to_string(), e)))
            .collect();
        let derived = [
            ("sect", self.sect.error()),
            ("lot_of_fortune", self.lot_of_fortune.error()),
            ("lot_of_spirit", self.lot_of_spirit.error()),
            ("chart_ruler", self.chart_ruler.error()),
        ];
        failures.extend(
            derived
                .into_iter()
                .filter_map(|(name, e)| e.map(|e| (name.to_string(), e))),
        );
        failures
    }
}
