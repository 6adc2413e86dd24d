//! Natal chart calculation.
//!
//! Civil time and place go in; ascendant, the seven traditional planets,
//! sect, the lots of Fortune and Spirit and the chart ruler come out, each
//! placed by sign, degree and house. Positions come from an
//! [`EphemerisAdapter`]; geocoding and timezone data come from the
//! collaborators in [`locality`] and [`time::ZoneRules`].

pub mod bodies;
pub mod chart;
pub mod ephemeris;
pub mod error;
pub mod houses;
pub mod locality;
pub mod service;
pub mod time;
pub mod western;
pub mod zodiac;

pub use bodies::{Body, ChartPoint};
pub use chart::{build_chart, BodyPosition, ChartAssembler, ChartOptions, ChartRuler, Field, NatalChart};
pub use ephemeris::{EphemerisAdapter, EphemerisError, GeoPosition, RawPositions, TableEphemeris};
pub use error::{ChartError, PointError};
pub use houses::{HouseStrategy, HouseSystem, QuadrantSystem};
pub use locality::{FixedZoneLookup, Gazetteer, Geocoder, Place, TimezoneLookup};
pub use service::{ChartRequest, ChartService};
pub use time::{CivilDateTime, Instant, OffsetZoneRules, TimezoneId, TzZoneRules, ZoneRules};
pub use western::{LotFormula, Sect};
pub use zodiac::{normalize_longitude, SignPlacement, ZodiacSign};
