use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{TimezoneApi, UtcOffsets, read_json};
use crate::error::ApiError;

const SERVICE: &str = "timezone";
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Google Maps time-zone client.
#[derive(Debug, Clone)]
pub struct GoogleTimezone {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GoogleTimezone {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }
}

#[async_trait]
impl TimezoneApi for GoogleTimezone {
    async fn offset_at(
        &self,
        lat: f64,
        lng: f64,
        timestamp: i64,
    ) -> Result<UtcOffsets, ApiError> {
        let url = format!("{}/maps/api/timezone/json", self.base_url);
        debug!("TIMEZONE: lat={lat} lng={lng} timestamp={timestamp}");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("location", format!("{lat},{lng}").as_str()),
                ("timestamp", timestamp.to_string().as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ApiError::Transport { service: SERVICE, source })?;

        read_json(SERVICE, res).await
    }
}
