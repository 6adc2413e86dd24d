//! Zodiac signs and the sign/degree resolver.
//!
//! Every longitude entering the chart passes through [`normalize_longitude`]
//! before any sign or house arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of one sign in degrees.
pub const SIGN_SPAN: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// All signs in ring order, starting at 0° Aries.
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Sign for a ring index; wraps indices past Pisces.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sign containing a longitude, after normalization.
    pub fn from_longitude(longitude: f64) -> Self {
        Self::from_index(sign_index(longitude))
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "aries",
            ZodiacSign::Taurus => "taurus",
            ZodiacSign::Gemini => "gemini",
            ZodiacSign::Cancer => "cancer",
            ZodiacSign::Leo => "leo",
            ZodiacSign::Virgo => "virgo",
            ZodiacSign::Libra => "libra",
            ZodiacSign::Scorpio => "scorpio",
            ZodiacSign::Sagittarius => "sagittarius",
            ZodiacSign::Capricorn => "capricorn",
            ZodiacSign::Aquarius => "aquarius",
            ZodiacSign::Pisces => "pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fold any longitude into [0, 360).
///
/// Uses floor-modulo, so negative input wraps forward (-30° is 330°).
/// `rem_euclid` can round a tiny negative value up to exactly 360.0; that
/// case is folded back to 0.0. Non-finite input maps to 0.0.
pub fn normalize_longitude(longitude: f64) -> f64 {
    if !longitude.is_finite() {
        return 0.0;
    }
    let normalized = longitude.rem_euclid(360.0);
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Ring index 0..=11 of the sign containing `longitude`.
pub fn sign_index(longitude: f64) -> usize {
    let normalized = normalize_longitude(longitude);
    ((normalized / SIGN_SPAN).floor() as usize).min(11)
}

/// Round to two decimals, half away from zero (`f64::round` semantics).
pub fn round_degree(degree: f64) -> f64 {
    (degree * 100.0).round() / 100.0
}

/// A longitude resolved to its sign and in-sign degree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignPlacement {
    /// Normalized longitude, unrounded.
    pub longitude: f64,
    pub sign: ZodiacSign,
    /// Degree within the sign, rounded to 0.01 and kept below 30.
    pub degree: f64,
}

/// Resolve a raw ecliptic longitude to sign and degree.
///
/// The degree is rounded to two decimal places, half away from zero.
/// A value that would round up to 30.00 is clamped to 29.99 so the reported
/// degree never leaves its sign.
pub fn resolve(longitude: f64) -> SignPlacement {
    let normalized = normalize_longitude(longitude);
    let index = sign_index(normalized);
    let raw_degree = normalized - index as f64 * SIGN_SPAN;
    let mut degree = round_degree(raw_degree.max(0.0));
    if degree >= SIGN_SPAN {
        degree = SIGN_SPAN - 0.01;
    }

    SignPlacement {
        longitude: normalized,
        sign: ZodiacSign::from_index(index),
        degree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_negative_and_large() {
        assert_eq!(normalize_longitude(-30.0), 330.0);
        assert_eq!(normalize_longitude(720.0), 0.0);
        assert_eq!(normalize_longitude(-720.5), 359.5);
        assert!((normalize_longitude(1085.25) - 5.25).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_tiny_negative_never_reaches_360() {
        let n = normalize_longitude(-1e-20);
        assert!(n >= 0.0 && n < 360.0);
    }

    #[test]
    fn test_sign_index_boundaries() {
        assert_eq!(sign_index(0.0), 0);
        assert_eq!(sign_index(29.9999), 0);
        assert_eq!(sign_index(30.0), 1);
        assert_eq!(sign_index(359.9999), 11);
        assert_eq!(sign_index(-0.5), 11);
    }

    #[test]
    fn test_resolve_ascendant_example() {
        let p = resolve(15.0);
        assert_eq!(p.sign, ZodiacSign::Aries);
        assert_eq!(p.degree, 15.0);
    }

    #[test]
    fn test_resolve_rounds_half_away_from_zero() {
        // 0.125 is exact in binary, so the half case is real
        let p = resolve(30.125);
        assert_eq!(p.sign, ZodiacSign::Taurus);
        assert_eq!(p.degree, 0.13);
    }

    #[test]
    fn test_resolve_clamps_degree_below_30() {
        let p = resolve(59.999);
        assert_eq!(p.sign, ZodiacSign::Taurus);
        assert_eq!(p.degree, 29.99);
    }

    #[test]
    fn test_resolve_round_trip_over_sweep() {
        let mut x = -1000.0;
        while x < 1000.0 {
            let p = resolve(x);
            assert!(p.degree >= 0.0 && p.degree < 30.0, "degree out of range for {x}");
            let rebuilt = p.sign.index() as f64 * 30.0 + p.degree;
            let diff = (rebuilt - normalize_longitude(x)).abs();
            assert!(diff <= 0.0101, "round trip failed for {x}: {rebuilt}");
            x += 7.37;
        }
    }

    #[test]
    fn test_sign_names_in_ring_order() {
        assert_eq!(ZodiacSign::from_index(3).name(), "cancer");
        assert_eq!(ZodiacSign::from_index(12), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::Pisces.index(), 11);
    }
}
