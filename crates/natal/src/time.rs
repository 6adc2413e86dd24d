//! Time normalization: civil wall-clock time to an astronomical instant.

use crate::error::ChartError;
use chrono::{
    DateTime, Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Julian Day of the Unix epoch, 1970-01-01T00:00:00 UT.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A validated local calendar date and 24-hour clock time, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CivilDateTime {
    local: NaiveDateTime,
}

impl CivilDateTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Self, ChartError> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ChartError::invalid_time(format!(
                "{year:04}-{month:02}-{day:02} is not a calendar date"
            ))
        })?;
        if hour > 23 {
            return Err(ChartError::invalid_time(format!("hour {hour} is outside 0-23")));
        }
        if minute > 59 {
            return Err(ChartError::invalid_time(format!(
                "minute {minute} is outside 0-59"
            )));
        }
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| ChartError::invalid_time(format!("{hour:02}:{minute:02}")))?;

        Ok(Self {
            local: date.and_time(time),
        })
    }

    /// Parse request strings: date as `YYYY-MM-DD`, time as `HH:MM` (24 h).
    pub fn parse(date: &str, time: &str) -> Result<Self, ChartError> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            ChartError::invalid_time(format!("date {date:?} is not YYYY-MM-DD: {e}"))
        })?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|e| ChartError::invalid_time(format!("time {time:?} is not HH:MM: {e}")))?;

        Self::new(
            date.year(),
            date.month(),
            date.day(),
            time.hour(),
            time.minute(),
        )
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.local
    }
}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%d %H:%M"))
    }
}

/// Identifier of a timezone, e.g. `Europe/Paris` or `UTC+02:00`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimezoneId(pub String);

impl TimezoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimezoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Offset rules of a timezone database.
///
/// Returns `None` when the zone is unknown. For a known zone the result
/// follows chrono's convention: `Single` for a regular time, `Ambiguous`
/// inside a fall-back overlap, `None` inside a spring-forward gap.
pub trait ZoneRules: Send + Sync {
    fn offsets(&self, zone: &TimezoneId, local: NaiveDateTime) -> Option<LocalResult<FixedOffset>>;
}

/// A moment on the UT time scale plus its Julian Day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instant {
    pub utc: DateTime<Utc>,
    pub julian_day: f64,
}

impl Instant {
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        Self {
            utc,
            julian_day: datetime_to_julian_day(utc),
        }
    }

    /// Civil time at an explicit UTC offset.
    pub fn from_offset(civil: &CivilDateTime, offset: FixedOffset) -> Result<Self, ChartError> {
        match offset.from_local_datetime(&civil.naive()) {
            LocalResult::Single(dt) => Ok(Self::from_utc(dt.with_timezone(&Utc))),
            _ => Err(ChartError::invalid_time(format!(
                "{civil} at offset {offset} is out of range"
            ))),
        }
    }

    /// Civil time in a named zone. Ambiguous local times are rejected, never
    /// resolved to one of the candidate offsets.
    pub fn from_zone(
        civil: &CivilDateTime,
        zone: &TimezoneId,
        rules: &dyn ZoneRules,
    ) -> Result<Self, ChartError> {
        let local = civil.naive();
        let result = rules
            .offsets(zone, local)
            .ok_or_else(|| ChartError::UnknownZone {
                zone: zone.to_string(),
            })?;

        match result {
            LocalResult::Single(offset) => Self::from_offset(civil, offset),
            LocalResult::Ambiguous(a, b) => {
                let (earliest, latest) = if a.local_minus_utc() >= b.local_minus_utc() {
                    (a, b)
                } else {
                    (b, a)
                };
                log::warn!("{civil} is ambiguous in {zone}: {earliest} or {latest}");
                Err(ChartError::AmbiguousLocalTime {
                    local,
                    earliest,
                    latest,
                })
            }
            LocalResult::None => Err(ChartError::invalid_time(format!(
                "{civil} does not exist in {zone} (skipped by a clock change)"
            ))),
        }
    }
}

/// Convert a UTC datetime to a Julian Day (UT).
pub fn datetime_to_julian_day(dt: DateTime<Utc>) -> f64 {
    UNIX_EPOCH_JD + dt.timestamp_millis() as f64 / MILLIS_PER_DAY
}

lazy_static::lazy_static! {
    static ref FIXED_ZONE: Regex =
        Regex::new(r"^(?:(?:UTC|GMT)?([+-])(\d{1,2})(?::?(\d{2}))?|UTC|GMT|Z)$").unwrap();
}

/// Parse a fixed-offset zone identifier such as `UTC`, `Z`, `UTC+05:30`,
/// `GMT-3` or `+0200`.
///
/// The `UTC`/`GMT` prefix and bare-hour forms are normalized to `+HH:MM`,
/// which chrono parses and range-checks.
pub fn parse_fixed_offset(id: &str) -> Option<FixedOffset> {
    let id = id.trim().to_uppercase();
    let caps = FIXED_ZONE.captures(&id)?;
    let (Some(sign), Some(hours)) = (caps.get(1), caps.get(2)) else {
        return FixedOffset::east_opt(0);
    };
    let minutes = caps.get(3).map_or("00", |m| m.as_str());
    format!("{}{:0>2}:{}", sign.as_str(), hours.as_str(), minutes)
        .parse::<FixedOffset>()
        .ok()
}

/// Zone rules for fixed-offset identifiers. Offsets never change, so every
/// local time maps to exactly one instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetZoneRules;

impl ZoneRules for OffsetZoneRules {
    fn offsets(&self, zone: &TimezoneId, _local: NaiveDateTime) -> Option<LocalResult<FixedOffset>> {
        parse_fixed_offset(zone.as_str()).map(LocalResult::Single)
    }
}

/// Zone rules from the IANA timezone database (`Europe/Paris`,
/// `America/New_York`), daylight saving included. Fixed-offset identifiers
/// are accepted as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct TzZoneRules;

impl ZoneRules for TzZoneRules {
    fn offsets(&self, zone: &TimezoneId, local: NaiveDateTime) -> Option<LocalResult<FixedOffset>> {
        if let Some(fixed) = parse_fixed_offset(zone.as_str()) {
            return Some(LocalResult::Single(fixed));
        }
        let tz: Tz = zone.as_str().trim().parse().ok()?;
        Some(match tz.offset_from_local_datetime(&local) {
            LocalResult::Single(offset) => LocalResult::Single(offset.fix()),
            LocalResult::Ambiguous(a, b) => LocalResult::Ambiguous(a.fix(), b.fix()),
            LocalResult::None => LocalResult::None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OverlapRules;

    impl ZoneRules for OverlapRules {
        fn offsets(&self, zone: &TimezoneId, local: NaiveDateTime) -> Option<LocalResult<FixedOffset>> {
            if zone.as_str() != "Test/Overlap" {
                return None;
            }
            let cest = FixedOffset::east_opt(2 * 3600).unwrap();
            let cet = FixedOffset::east_opt(3600).unwrap();
            match (local.hour(), local.minute()) {
                (2, _) => Some(LocalResult::Ambiguous(cest, cet)),
                (3, m) if m < 30 => Some(LocalResult::None),
                _ => Some(LocalResult::Single(cet)),
            }
        }
    }

    #[test]
    fn test_invalid_hour_and_minute() {
        assert!(matches!(
            CivilDateTime::new(2000, 1, 1, 25, 0),
            Err(ChartError::InvalidTimeInput { .. })
        ));
        assert!(matches!(
            CivilDateTime::new(2000, 1, 1, 12, 60),
            Err(ChartError::InvalidTimeInput { .. })
        ));
    }

    #[test]
    fn test_nonexistent_date() {
        assert!(CivilDateTime::new(2023, 2, 29, 0, 0).is_err());
        assert!(CivilDateTime::new(2024, 2, 29, 0, 0).is_ok());
        assert!(CivilDateTime::parse("2023-13-01", "10:00").is_err());
        assert!(CivilDateTime::parse("2023-01-01", "25:00").is_err());
    }

    #[test]
    fn test_parse_request_strings() {
        let civil = CivilDateTime::parse("1990-07-04", "14:30").unwrap();
        assert_eq!(civil.to_string(), "1990-07-04 14:30");
    }

    #[test]
    fn test_j2000_julian_day() {
        let civil = CivilDateTime::new(2000, 1, 1, 12, 0).unwrap();
        let instant = Instant::from_offset(&civil, FixedOffset::east_opt(0).unwrap()).unwrap();
        assert!((instant.julian_day - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_shifts_to_utc() {
        let civil = CivilDateTime::new(2000, 1, 1, 14, 0).unwrap();
        let instant = Instant::from_offset(&civil, FixedOffset::east_opt(2 * 3600).unwrap()).unwrap();
        assert!((instant.julian_day - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn test_minute_resolution() {
        let a = CivilDateTime::new(2000, 1, 1, 12, 0).unwrap();
        let b = CivilDateTime::new(2000, 1, 1, 12, 1).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let diff = Instant::from_offset(&b, utc).unwrap().julian_day
            - Instant::from_offset(&a, utc).unwrap().julian_day;
        assert!((diff - 1.0 / 1440.0).abs() < 1e-8);
    }

    #[test]
    fn test_ambiguous_local_time_is_rejected() {
        let civil = CivilDateTime::new(2023, 10, 29, 2, 30).unwrap();
        let err = Instant::from_zone(&civil, &TimezoneId::new("Test/Overlap"), &OverlapRules)
            .unwrap_err();
        match err {
            ChartError::AmbiguousLocalTime { earliest, latest, .. } => {
                assert_eq!(earliest.local_minus_utc(), 7200);
                assert_eq!(latest.local_minus_utc(), 3600);
            }
            other => panic!("expected AmbiguousLocalTime, got {other:?}"),
        }
    }

    #[test]
    fn test_gap_and_unknown_zone() {
        let civil = CivilDateTime::new(2023, 3, 26, 3, 10).unwrap();
        assert!(matches!(
            Instant::from_zone(&civil, &TimezoneId::new("Test/Overlap"), &OverlapRules),
            Err(ChartError::InvalidTimeInput { .. })
        ));
        assert!(matches!(
            Instant::from_zone(&civil, &TimezoneId::new("Mars/Olympus"), &OverlapRules),
            Err(ChartError::UnknownZone { .. })
        ));
    }

    #[test]
    fn test_parse_fixed_offsets() {
        assert_eq!(parse_fixed_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_fixed_offset("z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_fixed_offset("UTC+05:30").unwrap().local_minus_utc(), 19800);
        assert_eq!(parse_fixed_offset("GMT-3").unwrap().local_minus_utc(), -10800);
        assert_eq!(parse_fixed_offset("+0200").unwrap().local_minus_utc(), 7200);
        assert!(parse_fixed_offset("Europe/Paris").is_none());
        assert!(parse_fixed_offset("UTC+25").is_none());
        assert!(parse_fixed_offset("UTC+05:75").is_none());
        assert!(parse_fixed_offset("").is_none());
    }

    #[test]
    fn test_tz_rules_follow_daylight_saving() {
        let july = CivilDateTime::new(1990, 7, 4, 14, 30).unwrap();
        let instant =
            Instant::from_zone(&july, &TimezoneId::new("America/New_York"), &TzZoneRules).unwrap();
        assert_eq!(instant.utc.to_rfc3339(), "1990-07-04T18:30:00+00:00");

        let january = CivilDateTime::new(1990, 1, 4, 14, 30).unwrap();
        let instant =
            Instant::from_zone(&january, &TimezoneId::new("America/New_York"), &TzZoneRules)
                .unwrap();
        assert_eq!(instant.utc.to_rfc3339(), "1990-01-04T19:30:00+00:00");
    }

    #[test]
    fn test_tz_rules_paris_overlap_and_gap() {
        let paris = TimezoneId::new("Europe/Paris");

        let overlap = CivilDateTime::new(2023, 10, 29, 2, 30).unwrap();
        match Instant::from_zone(&overlap, &paris, &TzZoneRules).unwrap_err() {
            ChartError::AmbiguousLocalTime { earliest, latest, .. } => {
                assert_eq!(earliest.local_minus_utc(), 7200);
                assert_eq!(latest.local_minus_utc(), 3600);
            }
            other => panic!("expected AmbiguousLocalTime, got {other:?}"),
        }

        let gap = CivilDateTime::new(2023, 3, 26, 2, 30).unwrap();
        assert!(matches!(
            Instant::from_zone(&gap, &paris, &TzZoneRules),
            Err(ChartError::InvalidTimeInput { .. })
        ));
    }

    #[test]
    fn test_tz_rules_unknown_and_fixed_zones() {
        let civil = CivilDateTime::new(2000, 1, 1, 12, 0).unwrap();
        assert!(matches!(
            Instant::from_zone(&civil, &TimezoneId::new("Mars/Olympus"), &TzZoneRules),
            Err(ChartError::UnknownZone { .. })
        ));
        let instant = Instant::from_zone(&civil, &TimezoneId::new("UTC+02:00"), &TzZoneRules)
            .unwrap();
        assert_eq!(instant.utc.to_rfc3339(), "2000-01-01T10:00:00+00:00");
    }
}
