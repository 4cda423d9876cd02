//! Weather lookup with local-vs-provider time-zone correction.

use std::sync::Arc;

use tracing::{error, warn};

use crate::api::{ForecastResponse, TimezoneApi, WeatherApi};
use crate::context::Location;
use crate::instant::ResolvedInstant;

/// One instant's reading plus the encompassing day's aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub point: PointConditions,
    pub day: DayRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointConditions {
    pub temperature: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayRange {
    pub min_temp: f64,
    pub max_temp: f64,
    pub summary: String,
}

/// Fetches weather for a location at a resolved instant.
///
/// Failure policy is tolerant: any provider or shape problem is logged and
/// surfaces as `None`, so the turn can still answer with a degraded
/// message instead of failing outright.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    weather: Arc<dyn WeatherApi>,
    timezone: Arc<dyn TimezoneApi>,
}

impl WeatherFetcher {
    pub fn new(weather: Arc<dyn WeatherApi>, timezone: Arc<dyn TimezoneApi>) -> Self {
        Self { weather, timezone }
    }

    pub async fn fetch(
        &self,
        location: Location,
        instant: &ResolvedInstant,
    ) -> Option<WeatherSnapshot> {
        let response = if instant.implicit_now {
            self.weather.fetch_now(location.lat, location.lng).await
        } else {
            let timestamp = self.provider_timestamp(location, instant.timestamp).await;
            self.weather.fetch_at(location.lat, location.lng, timestamp).await
        };

        match response {
            Ok(response) => snapshot(response),
            Err(err) => {
                error!("unable to load weather for {location:?}: {err}");
                None
            }
        }
    }

    /// The resolved instant is in the caller's naive local clock, but the
    /// provider's time-machine request expects the location's local time.
    /// Shift by the location's UTC offsets; on lookup failure keep the
    /// uncorrected instant rather than blocking the turn on a secondary
    /// lookup.
    async fn provider_timestamp(&self, location: Location, timestamp: i64) -> i64 {
        match self.timezone.offset_at(location.lat, location.lng, timestamp).await {
            Ok(offsets) => timestamp - offsets.dst_offset - offsets.raw_offset,
            Err(err) => {
                warn!("unable to load time zone for {location:?}: {err}");
                timestamp
            }
        }
    }
}

fn snapshot(response: ForecastResponse) -> Option<WeatherSnapshot> {
    let Some(day) = response.daily.data.into_iter().next() else {
        warn!("weather response contained no daily data");
        return None;
    };

    Some(WeatherSnapshot {
        point: PointConditions {
            temperature: response.currently.temperature,
            summary: response.currently.summary,
        },
        day: DayRange {
            min_temp: day.temperature_min,
            max_temp: day.temperature_max,
            summary: day.summary,
        },
    })
}
