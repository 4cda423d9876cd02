//! External collaborator contracts and their typed wire shapes.
//!
//! Each collaborator is a trait so the dialogue logic can be exercised
//! against stubs; the HTTP implementations live in the submodules.
//! Responses are parsed into explicit shapes at this boundary so a
//! missing key fails as [`ApiError::Malformed`] instead of surfacing
//! deep inside business logic.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::context::Location;
use crate::error::ApiError;

pub mod darksky;
pub mod geocode;
pub mod timezone;
pub mod webcams;

pub use darksky::DarkSky;
pub use geocode::GoogleGeocoder;
pub use timezone::GoogleTimezone;
pub use webcams::WebcamsTravel;

/// Free-text address to coordinates.
#[async_trait]
pub trait GeocodeApi: Send + Sync + Debug {
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, ApiError>;
}

/// Point-in-time weather plus the encompassing day's aggregate.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn fetch_now(&self, lat: f64, lng: f64) -> Result<ForecastResponse, ApiError>;
    async fn fetch_at(&self, lat: f64, lng: f64, timestamp: i64)
    -> Result<ForecastResponse, ApiError>;
}

/// UTC offset of a coordinate at a given instant.
#[async_trait]
pub trait TimezoneApi: Send + Sync + Debug {
    async fn offset_at(&self, lat: f64, lng: f64, timestamp: i64)
    -> Result<UtcOffsets, ApiError>;
}

/// Webcams near a coordinate, ordered by popularity.
#[async_trait]
pub trait WebcamApi: Send + Sync + Debug {
    async fn nearby(&self, lat: f64, lng: f64, radius_km: u32)
    -> Result<Vec<WebcamEntry>, ApiError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Location,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub currently: PointReport,
    pub daily: DailyReports,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointReport {
    pub temperature: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyReports {
    #[serde(default)]
    pub data: Vec<DayReport>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayReport {
    #[serde(rename = "temperatureMin")]
    pub temperature_min: f64,
    #[serde(rename = "temperatureMax")]
    pub temperature_max: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UtcOffsets {
    /// Daylight-saving offset at the instant, seconds.
    #[serde(rename = "dstOffset")]
    pub dst_offset: i64,
    /// Standard UTC offset of the time zone, seconds.
    #[serde(rename = "rawOffset")]
    pub raw_offset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamListResponse {
    pub result: WebcamList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamList {
    #[serde(default)]
    pub webcams: Vec<WebcamEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamEntry {
    pub title: String,
    pub image: WebcamImage,
    #[serde(default)]
    pub url: Option<WebcamUrl>,
    /// Epoch seconds of the last image update.
    pub update: i64,
    pub location: WebcamPlace,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamImage {
    pub current: WebcamImageVariants,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamImageVariants {
    pub thumbnail: String,
    pub preview: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamUrl {
    pub current: WebcamUrlVariants,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamUrlVariants {
    pub mobile: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebcamPlace {
    /// IANA time zone name of the webcam's location.
    pub timezone: String,
}

/// Check the status and decode the body, shared by every client.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    res: reqwest::Response,
) -> Result<T, ApiError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| ApiError::Transport { service, source })?;

    if !status.is_success() {
        return Err(ApiError::Status { service, status, body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(|source| ApiError::Malformed { service, source })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_caps_long_bodies() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn forecast_response_decodes_provider_field_names() {
        let body = r#"{
            "currently": {"temperature": 19.62, "summary": "Clear"},
            "daily": {"data": [
                {"temperatureMin": 12.1, "temperatureMax": 24.9, "summary": "Clear all day"}
            ]}
        }"#;

        let parsed: ForecastResponse = serde_json::from_str(body).expect("decodes");
        assert_eq!(parsed.currently.temperature, 19.62);
        assert_eq!(parsed.daily.data[0].temperature_max, 24.9);
    }

    #[test]
    fn webcam_entry_tolerates_missing_url_block() {
        let body = r#"{
            "title": "Harbor",
            "image": {"current": {"thumbnail": "t.jpg", "preview": "p.jpg"}},
            "update": 1700000000,
            "location": {"timezone": "Europe/Berlin"}
        }"#;

        let parsed: WebcamEntry = serde_json::from_str(body).expect("decodes");
        assert!(parsed.url.is_none());
        assert_eq!(parsed.location.timezone, "Europe/Berlin");
    }
}
