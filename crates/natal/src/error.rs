use crate::bodies::{Body, ChartPoint};
use crate::ephemeris::EphemerisError;
use chrono::{FixedOffset, NaiveDateTime};
use thiserror::Error;

/// Errors that abort a whole chart request.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid time input: {message}")]
    InvalidTimeInput { message: String },
    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
    #[error("Location not found: {place}")]
    LocationNotFound { place: String },
    #[error("Could not determine timezone for {latitude}, {longitude}")]
    TimezoneUnknown { latitude: f64, longitude: f64 },
    #[error("Unknown timezone identifier: {zone}")]
    UnknownZone { zone: String },
    #[error("Local time {local} is ambiguous: offsets {earliest} and {latest} both apply")]
    AmbiguousLocalTime {
        local: NaiveDateTime,
        earliest: FixedOffset,
        latest: FixedOffset,
    },
    #[error("Ephemeris unavailable: {0}")]
    EphemerisUnavailable(#[from] EphemerisError),
    #[error("{collaborator} did not answer within {seconds:.1}s")]
    CollaboratorTimeout {
        collaborator: &'static str,
        seconds: f64,
    },
}

impl ChartError {
    pub(crate) fn invalid_time(message: impl Into<String>) -> Self {
        ChartError::InvalidTimeInput {
            message: message.into(),
        }
    }

    /// Short machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            ChartError::MissingField(_) => "missing_field",
            ChartError::InvalidTimeInput { .. } => "invalid_time_input",
            ChartError::InvalidLocation { .. } => "invalid_location",
            ChartError::LocationNotFound { .. } => "location_not_found",
            ChartError::TimezoneUnknown { .. } | ChartError::UnknownZone { .. } => {
                "timezone_unknown"
            }
            ChartError::AmbiguousLocalTime { .. } => "ambiguous_local_time",
            ChartError::EphemerisUnavailable(_) => "ephemeris_unavailable",
            ChartError::CollaboratorTimeout { .. } => "collaborator_timeout",
        }
    }
}

/// Failures scoped to one field of the chart. The rest of the chart survives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointError {
    #[error("{body} not found in ephemeris output")]
    BodyUnavailable { body: Body },
    #[error("No house available for {point}")]
    HouseUnavailable { point: ChartPoint },
    #[error("{ruler} not found in chart")]
    RulerBodyMissing { ruler: Body },
    #[error("Missing Sun or Moon")]
    SunOrMoonMissing,
}

impl PointError {
    pub fn kind(&self) -> &'static str {
        match self {
            PointError::BodyUnavailable { .. } => "body_unavailable",
            PointError::HouseUnavailable { .. } => "house_unavailable",
            PointError::RulerBodyMissing { .. } => "ruler_body_missing",
            PointError::SunOrMoonMissing => "sun_or_moon_missing",
        }
    }
}
