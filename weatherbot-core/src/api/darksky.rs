use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ForecastResponse, WeatherApi, read_json};
use crate::error::ApiError;

const SERVICE: &str = "darksky";
const DEFAULT_BASE_URL: &str = "https://api.darksky.net";

/// Dark Sky forecast client. The `,timestamp` path form is the provider's
/// "time machine" request; it expects the timestamp in the location's
/// local time zone.
#[derive(Debug, Clone)]
pub struct DarkSky {
    api_key: String,
    base_url: String,
    http: Client,
}

impl DarkSky {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    async fn fetch(&self, path: String) -> Result<ForecastResponse, ApiError> {
        let url = format!("{}/forecast/{}/{}", self.base_url, self.api_key, path);

        let res = self
            .http
            .get(&url)
            .query(&[("exclude", "minutely,hourly,flags"), ("units", "si")])
            .send()
            .await
            .map_err(|source| ApiError::Transport { service: SERVICE, source })?;

        read_json(SERVICE, res).await
    }
}

#[async_trait]
impl WeatherApi for DarkSky {
    async fn fetch_now(&self, lat: f64, lng: f64) -> Result<ForecastResponse, ApiError> {
        debug!("DARKSKY: lat={lat} lng={lng}");
        self.fetch(format!("{lat},{lng}")).await
    }

    async fn fetch_at(
        &self,
        lat: f64,
        lng: f64,
        timestamp: i64,
    ) -> Result<ForecastResponse, ApiError> {
        debug!("DARKSKY: lat={lat} lng={lng} timestamp={timestamp}");
        self.fetch(format!("{lat},{lng},{timestamp}")).await
    }
}
