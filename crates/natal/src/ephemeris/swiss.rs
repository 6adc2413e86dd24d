use crate::bodies::Body;
use crate::ephemeris::adapter::{validate_positions, EphemerisAdapter, EphemerisError};
use crate::ephemeris::types::{GeoPosition, RawPositions};
use crate::houses::{house_from_cusps, HouseSystem};
use crate::time::Instant;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use swisseph::swe::{calc_ut, houses_ex};
use swisseph::{AscMc, Cusp};

/// Earliest Julian Day served, roughly 3000 BCE.
pub const MIN_JULIAN_DAY: f64 = 625_673.5;
/// Latest Julian Day served, roughly 3000 CE.
pub const MAX_JULIAN_DAY: f64 = 2_816_787.5;

// FLG_SWIEPH = 2 (use Swiss Ephemeris files)
const FLAGS: i32 = 2;

fn planet_code(body: Body) -> u32 {
    match body {
        Body::Sun => 0,
        Body::Moon => 1,
        Body::Mercury => 2,
        Body::Venus => 3,
        Body::Mars => 4,
        Body::Jupiter => 5,
        Body::Saturn => 6,
    }
}

/// Swiss Ephemeris adapter implementation
pub struct SwissEphemerisAdapter {
    ephemeris_path: PathBuf,
}

impl SwissEphemerisAdapter {
    /// Create a new adapter with optional ephemeris path
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/usr/local/share/swisseph"))
        });

        if !path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }
        log::debug!("Swiss Ephemeris data at {}", path.display());

        Ok(Self {
            ephemeris_path: path,
        })
    }

    pub fn ephemeris_path(&self) -> &PathBuf {
        &self.ephemeris_path
    }

    fn calc_longitude(&self, body: Body, jd: f64) -> Result<f64, EphemerisError> {
        let result = calc_ut(jd, planet_code(body), FLAGS as u32).map_err(|e| {
            EphemerisError::CalculationFailed {
                body: body.to_string(),
                message: format!("Swiss Ephemeris error at JD {jd}: {e}"),
            }
        })?;
        Ok(result.out[0])
    }

    fn calc_houses(
        &self,
        jd: f64,
        location: &GeoPosition,
        house_system: HouseSystem,
    ) -> (f64, [f64; 12]) {
        let (c, a) = houses_ex(
            jd,
            FLAGS,
            location.latitude,
            location.longitude,
            house_system.swiss_code() as i32,
        );
        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);

        let cusp_values = [
            cusps.first, cusps.second, cusps.third, cusps.fourth,
            cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
            cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
        ];
        (ascmc.ascendant, cusp_values)
    }
}

impl EphemerisAdapter for SwissEphemerisAdapter {
    fn positions(
        &self,
        instant: &Instant,
        location: &GeoPosition,
        house_system: HouseSystem,
        bodies: &[Body],
    ) -> Result<RawPositions, EphemerisError> {
        let jd = instant.julian_day;
        if !(MIN_JULIAN_DAY..=MAX_JULIAN_DAY).contains(&jd) {
            return Err(EphemerisError::OutOfRange {
                julian_day: jd,
                min: MIN_JULIAN_DAY,
                max: MAX_JULIAN_DAY,
            });
        }

        let mut longitudes = BTreeMap::new();
        for &body in bodies {
            longitudes.insert(body, self.calc_longitude(body, jd)?);
        }

        let (ascendant, cusps) = self.calc_houses(jd, location, house_system);

        let mut raw = RawPositions {
            ascendant,
            bodies: longitudes,
            body_houses: None,
            cusps: None,
        };
        if !house_system.is_whole_sign() {
            let houses = raw
                .bodies
                .iter()
                .filter_map(|(body, lon)| house_from_cusps(&cusps, *lon).map(|h| (*body, h)))
                .collect();
            raw.body_houses = Some(houses);
            raw.cusps = Some(cusps);
        }

        validate_positions(&raw)?;
        Ok(raw)
    }
}
