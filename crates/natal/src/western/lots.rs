//! Sect and the Hellenistic lots of Fortune and Spirit.

use crate::zodiac::normalize_longitude;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sect {
    Day,
    Night,
}

impl fmt::Display for Sect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sect::Day => f.write_str("day"),
            Sect::Night => f.write_str("night"),
        }
    }
}

/// Which formulas the lots use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotFormula {
    /// Day formulas by day, Sun and Moon swapped by night.
    #[default]
    SectAware,
    /// Day formulas regardless of sect.
    DayOnly,
}

impl FromStr for LotFormula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sect_aware" => Ok(LotFormula::SectAware),
            "day_only" | "legacy" => Ok(LotFormula::DayOnly),
            other => Err(format!(
                "Invalid lot formula: {other}. Valid formulas: sect_aware, day_only"
            )),
        }
    }
}

/// Sect from the Sun's arc past the ascendant: less than 180° is day.
pub fn sect_of(ascendant: f64, sun: f64) -> Sect {
    let diff = normalize_longitude(sun - ascendant);
    if diff < 180.0 {
        Sect::Day
    } else {
        Sect::Night
    }
}

/// Lot of Fortune: Asc + Moon - Sun by day; Asc + Sun - Moon by night
/// under [`LotFormula::SectAware`].
pub fn lot_of_fortune(ascendant: f64, sun: f64, moon: f64, sect: Sect, formula: LotFormula) -> f64 {
    match (sect, formula) {
        (Sect::Night, LotFormula::SectAware) => normalize_longitude(ascendant + sun - moon),
        _ => normalize_longitude(ascendant + moon - sun),
    }
}

/// Lot of Spirit: Asc + Sun - Moon by day; Asc + Moon - Sun by night
/// under [`LotFormula::SectAware`].
pub fn lot_of_spirit(ascendant: f64, sun: f64, moon: f64, sect: Sect, formula: LotFormula) -> f64 {
    match (sect, formula) {
        (Sect::Night, LotFormula::SectAware) => normalize_longitude(ascendant + moon - sun),
        _ => normalize_longitude(ascendant + sun - moon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        let d = normalize_longitude(a - b);
        d < 1e-9 || d > 360.0 - 1e-9
    }

    #[test]
    fn test_day_sect_example() {
        assert_eq!(sect_of(10.0, 100.0), Sect::Day);
        assert_eq!(sect_of(10.0, 200.0), Sect::Night);
        // Sun exactly on the descendant counts as night
        assert_eq!(sect_of(10.0, 190.0), Sect::Night);
        assert_eq!(sect_of(350.0, 20.0), Sect::Day);
    }

    #[test]
    fn test_sect_invariant_under_rotation() {
        let cases = [(10.0, 100.0), (10.0, 250.0), (300.0, 20.0), (123.4, 300.1)];
        for (asc, sun) in cases {
            let base = sect_of(asc, sun);
            for k in 0..24 {
                let offset = k as f64 * 37.5 - 400.0;
                assert_eq!(sect_of(asc + offset, sun + offset), base);
            }
        }
    }

    #[test]
    fn test_fortune_day_example() {
        let lot = lot_of_fortune(10.0, 100.0, 280.0, Sect::Day, LotFormula::SectAware);
        assert!(close(lot, 190.0));
    }

    #[test]
    fn test_night_swaps_formulas() {
        let (asc, sun, moon) = (40.0, 250.0, 75.0);
        let fortune_night = lot_of_fortune(asc, sun, moon, Sect::Night, LotFormula::SectAware);
        let spirit_day = lot_of_spirit(asc, sun, moon, Sect::Day, LotFormula::SectAware);
        assert!(close(fortune_night, spirit_day));

        // Day Fortune with the lights swapped is the night Fortune
        let swapped = lot_of_fortune(asc, moon, sun, Sect::Day, LotFormula::SectAware);
        assert!(close(swapped, fortune_night));

        let spirit_night = lot_of_spirit(asc, sun, moon, Sect::Night, LotFormula::SectAware);
        let fortune_day = lot_of_fortune(asc, sun, moon, Sect::Day, LotFormula::SectAware);
        assert!(close(spirit_night, fortune_day));
    }

    #[test]
    fn test_lots_reflect_about_ascendant() {
        for (asc, sun, moon) in [(10.0, 100.0, 280.0), (200.0, 5.0, 355.0), (-15.0, 720.5, 33.0)] {
            for sect in [Sect::Day, Sect::Night] {
                for formula in [LotFormula::SectAware, LotFormula::DayOnly] {
                    let f = lot_of_fortune(asc, sun, moon, sect, formula);
                    let s = lot_of_spirit(asc, sun, moon, sect, formula);
                    assert!(close(f + s, 2.0 * asc));
                    assert!((0.0..360.0).contains(&f));
                }
            }
        }
    }

    #[test]
    fn test_day_only_ignores_sect() {
        let (asc, sun, moon) = (10.0, 250.0, 75.0);
        assert_eq!(
            lot_of_fortune(asc, sun, moon, Sect::Night, LotFormula::DayOnly),
            lot_of_fortune(asc, sun, moon, Sect::Day, LotFormula::DayOnly)
        );
        assert_eq!(
            lot_of_spirit(asc, sun, moon, Sect::Night, LotFormula::DayOnly),
            lot_of_spirit(asc, sun, moon, Sect::Day, LotFormula::SectAware)
        );
    }

    #[test]
    fn test_parse_lot_formula() {
        assert_eq!("sect_aware".parse::<LotFormula>(), Ok(LotFormula::SectAware));
        assert_eq!("legacy".parse::<LotFormula>(), Ok(LotFormula::DayOnly));
        assert!("reversed".parse::<LotFormula>().is_err());
    }
}
