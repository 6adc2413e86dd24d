//! Request-level orchestration: place name and local time in, chart out.

use crate::chart::{ChartAssembler, ChartOptions, NatalChart};
use crate::ephemeris::EphemerisAdapter;
use crate::error::ChartError;
use crate::locality::{Geocoder, TimezoneLookup};
use crate::time::{CivilDateTime, Instant, ZoneRules};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A chart request as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    /// Birth date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// Local birth time, `HH:MM`
    #[serde(default)]
    pub time: String,
    /// Place name for the geocoder
    #[serde(default)]
    pub location: String,
}

impl ChartRequest {
    pub fn new(date: impl Into<String>, time: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            location: location.into(),
        }
    }

    fn validate(&self) -> Result<(), ChartError> {
        for (name, value) in [
            ("date", &self.date),
            ("time", &self.time),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(ChartError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Chart generation with injected collaborators.
#[derive(Clone)]
pub struct ChartService {
    geocoder: Arc<dyn Geocoder>,
    timezones: Arc<dyn TimezoneLookup>,
    zone_rules: Arc<dyn ZoneRules>,
    ephemeris: Arc<dyn EphemerisAdapter>,
    options: ChartOptions,
    timeout: Option<Duration>,
}

impl ChartService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        timezones: Arc<dyn TimezoneLookup>,
        zone_rules: Arc<dyn ZoneRules>,
        ephemeris: Arc<dyn EphemerisAdapter>,
        options: ChartOptions,
    ) -> Self {
        Self {
            geocoder,
            timezones,
            zone_rules,
            ephemeris,
            options,
            timeout: None,
        }
    }

    /// Bound each remote collaborator call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    async fn bounded<T>(
        &self,
        collaborator: &'static str,
        call: impl Future<Output = T>,
    ) -> Result<T, ChartError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                log::warn!("{collaborator} timed out after {limit:?}");
                ChartError::CollaboratorTimeout {
                    collaborator,
                    seconds: limit.as_secs_f64(),
                }
            }),
            None => Ok(call.await),
        }
    }

    /// Generate a chart. Input problems are rejected before any collaborator
    /// is called.
    pub async fn generate(&self, request: &ChartRequest) -> Result<NatalChart, ChartError> {
        request.validate()?;
        let civil = CivilDateTime::parse(&request.date, &request.time)?;

        let place = request.location.trim();
        let position = self
            .bounded("geocoder", self.geocoder.resolve(place))
            .await?
            .ok_or_else(|| ChartError::LocationNotFound {
                place: place.to_string(),
            })?;

        let zone = self
            .bounded("timezone lookup", self.timezones.zone_at(position))
            .await?
            .ok_or(ChartError::TimezoneUnknown {
                latitude: position.latitude,
                longitude: position.longitude,
            })?;

        let instant = Instant::from_zone(&civil, &zone, self.zone_rules.as_ref())?;
        log::info!(
            "chart for {place} ({:.4}, {:.4}) at {civil} {zone} -> {}",
            position.latitude,
            position.longitude,
            instant.utc
        );

        ChartAssembler::new(self.ephemeris.as_ref(), self.options.clone()).assemble(instant, position)
    }
}
