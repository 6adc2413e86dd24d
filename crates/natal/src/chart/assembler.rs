use crate::bodies::{Body, ChartPoint};
use crate::chart::settings::ChartOptions;
use crate::chart::types::{BodyPosition, ChartRuler, Field, NatalChart};
use crate::ephemeris::{validate_positions, EphemerisAdapter, GeoPosition, RawPositions};
use crate::error::{ChartError, PointError};
use crate::houses::HouseStrategy;
use crate::time::{CivilDateTime, Instant};
use crate::western::{lot_of_fortune, lot_of_spirit, sect_of, sign_ruler, Sect};
use crate::zodiac;
use chrono::FixedOffset;
use std::collections::BTreeMap;

/// Builds natal charts from an injected ephemeris.
pub struct ChartAssembler<'a> {
    ephemeris: &'a dyn EphemerisAdapter,
    options: ChartOptions,
}

impl<'a> ChartAssembler<'a> {
    pub fn new(ephemeris: &'a dyn EphemerisAdapter, options: ChartOptions) -> Self {
        Self { ephemeris, options }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Query the ephemeris once and build the chart. Only an ephemeris
    /// failure aborts; anything narrower is recorded in the chart.
    ///
    /// Adapter output is validated here whatever the adapter, so a
    /// non-finite longitude or a house outside 1..=12 never reaches a chart.
    pub fn assemble(&self, instant: Instant, location: GeoPosition) -> Result<NatalChart, ChartError> {
        let raw = self.ephemeris.positions(
            &instant,
            &location,
            self.options.house_system,
            &self.options.bodies,
        )?;
        validate_positions(&raw)?;
        log::debug!(
            "ephemeris returned {} bodies for JD {:.5}",
            raw.bodies.len(),
            instant.julian_day
        );
        Ok(build_chart(&raw, &self.options, instant, location))
    }

    /// Civil time at an explicit UTC offset.
    pub fn cast(
        &self,
        civil: &CivilDateTime,
        offset: FixedOffset,
        location: GeoPosition,
    ) -> Result<NatalChart, ChartError> {
        let instant = Instant::from_offset(civil, offset)?;
        self.assemble(instant, location)
    }
}

fn place(
    point: ChartPoint,
    longitude: f64,
    houses: &dyn HouseStrategy,
) -> Result<BodyPosition, PointError> {
    let placement = zodiac::resolve(longitude);
    let house = houses.house_of(point, placement.longitude)?;
    Ok(BodyPosition {
        point,
        longitude: placement.longitude,
        sign: placement.sign,
        degree: placement.degree,
        house,
    })
}

/// Assemble a chart from raw ephemeris output. Never fails as a whole.
pub fn build_chart(
    raw: &RawPositions,
    options: &ChartOptions,
    instant: Instant,
    location: GeoPosition,
) -> NatalChart {
    let asc_placement = zodiac::resolve(raw.ascendant);
    let houses = options.house_system.strategy(asc_placement.longitude, raw);

    let ascendant = BodyPosition {
        point: ChartPoint::Ascendant,
        longitude: asc_placement.longitude,
        sign: asc_placement.sign,
        degree: asc_placement.degree,
        house: 1,
    };

    let mut planets = BTreeMap::new();
    for &body in &options.bodies {
        let field = match raw.longitude(body).filter(|lon| lon.is_finite()) {
            Some(lon) => Field::from_result(place(ChartPoint::Body(body), lon, houses.as_ref())),
            None => Field::Unavailable(PointError::BodyUnavailable { body }),
        };
        if let Field::Unavailable(e) = &field {
            log::warn!("{body}: {e}");
        }
        planets.insert(body, field);
    }

    let light = |body: Body| {
        options
            .bodies
            .contains(&body)
            .then(|| raw.longitude(body))
            .flatten()
            .filter(|lon| lon.is_finite())
            .map(zodiac::normalize_longitude)
    };
    let lights = light(Body::Sun).zip(light(Body::Moon));

    let (sect, lot_of_fortune_field, lot_of_spirit_field) = match lights {
        Some((sun, moon)) => {
            let asc = ascendant.longitude;
            let sect = sect_of(asc, sun);
            let fortune = lot_of_fortune(asc, sun, moon, sect, options.lot_formula);
            let spirit = lot_of_spirit(asc, sun, moon, sect, options.lot_formula);
            (
                Field::Available(sect),
                Field::from_result(place(ChartPoint::LotOfFortune, fortune, houses.as_ref())),
                Field::from_result(place(ChartPoint::LotOfSpirit, spirit, houses.as_ref())),
            )
        }
        None => {
            log::warn!("sect and lots skipped: Sun or Moon unavailable");
            (
                Field::<Sect>::Unavailable(PointError::SunOrMoonMissing),
                Field::Unavailable(PointError::SunOrMoonMissing),
                Field::Unavailable(PointError::SunOrMoonMissing),
            )
        }
    };

    let ruler = sign_ruler(ascendant.sign);
    let chart_ruler = match planets.get(&ruler).and_then(Field::value) {
        Some(position) => Field::Available(ChartRuler {
            planet: ruler,
            position: *position,
        }),
        None => {
            log::warn!("chart ruler {ruler} is not available");
            Field::Unavailable(PointError::RulerBodyMissing { ruler })
        }
    };

    NatalChart {
        instant,
        location,
        house_system: houses.system(),
        lot_formula: options.lot_formula,
        ascendant,
        planets,
        sect,
        lot_of_fortune: lot_of_fortune_field,
        lot_of_spirit: lot_of_spirit_field,
        chart_ruler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::houses::{HouseSystem, QuadrantSystem};
    use crate::zodiac::ZodiacSign;
    use chrono::{TimeZone, Utc};

    fn instant() -> Instant {
        Instant::from_utc(Utc.with_ymd_and_hms(1990, 7, 4, 12, 0, 0).unwrap())
    }

    fn geo() -> GeoPosition {
        GeoPosition::new(40.7128, -74.0060).unwrap()
    }

    #[test]
    fn test_lots_follow_quadrant_strategy() {
        let mut raw = RawPositions::new(10.0)
            .with_body(Body::Sun, 100.0)
            .with_body(Body::Moon, 280.0)
            .with_body(Body::Mars, 20.0);
        raw.cusps = Some([
            10.0, 35.0, 65.0, 95.0, 125.0, 160.0, 190.0, 215.0, 245.0, 275.0, 305.0, 340.0,
        ]);
        let options = ChartOptions {
            house_system: HouseSystem::Quadrant(QuadrantSystem::Placidus),
            ..ChartOptions::default()
        };
        let chart = build_chart(&raw, &options, instant(), geo());

        // Lot of Fortune at 190° sits on the 7th cusp
        let fortune = chart.lot_of_fortune.value().unwrap();
        assert_eq!(fortune.house, 7);
        assert_eq!(chart.planet(Body::Sun).unwrap().house, 4);
        assert_eq!(chart.ascendant.house, 1);
        assert_eq!(
            chart.house_system,
            HouseSystem::Quadrant(QuadrantSystem::Placidus)
        );
    }

    #[test]
    fn test_quadrant_missing_house_is_partial() {
        let mut raw = RawPositions::new(10.0)
            .with_body(Body::Sun, 100.0)
            .with_body(Body::Moon, 280.0);
        raw.body_houses = Some(BTreeMap::from([(Body::Sun, 10)]));
        let options = ChartOptions {
            house_system: HouseSystem::Quadrant(QuadrantSystem::Koch),
            bodies: vec![Body::Sun, Body::Moon, Body::Mars],
            ..ChartOptions::default()
        };
        let chart = build_chart(&raw, &options, instant(), geo());

        assert_eq!(chart.planet(Body::Sun).unwrap().house, 10);
        assert_eq!(
            chart.planets[&Body::Moon],
            Field::Unavailable(PointError::HouseUnavailable {
                point: ChartPoint::Body(Body::Moon)
            })
        );
        assert_eq!(chart.ascendant.sign, ZodiacSign::Aries);
        // Ascendant in Aries: Mars rules but was never returned
        assert_eq!(
            chart.chart_ruler,
            Field::Unavailable(PointError::RulerBodyMissing { ruler: Body::Mars })
        );
        assert_eq!(
            chart.planets[&Body::Mars],
            Field::Unavailable(PointError::BodyUnavailable { body: Body::Mars })
        );
        // The lights' longitudes are known, so sect and lots still resolve;
        // without cusps the lots cannot be housed
        assert_eq!(chart.sect, Field::Available(Sect::Day));
        assert_eq!(
            chart.lot_of_fortune,
            Field::Unavailable(PointError::HouseUnavailable {
                point: ChartPoint::LotOfFortune
            })
        );
        assert_eq!(chart.failures().len(), 5);
    }
}
