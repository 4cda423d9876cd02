use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{GeocodeApi, GeocodeResponse, read_json};
use crate::error::ApiError;

const SERVICE: &str = "geocoding";
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Google Maps geocoding client.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GoogleGeocoder {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }
}

#[async_trait]
impl GeocodeApi for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, ApiError> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        debug!("GEOCODE: address={address}");

        let res = self
            .http
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| ApiError::Transport { service: SERVICE, source })?;

        read_json(SERVICE, res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_a_single_result() {
        let server = MockServer::start().await;
        let body = r#"{
            "results": [
                {"geometry": {"location": {"lat": 52.520008, "lng": 13.404954}}}
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "Berlin"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = GoogleGeocoder::with_base_url("test-key".to_string(), server.uri());
        let response = client.geocode("Berlin").await.expect("request succeeds");

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].geometry.location.lat, 52.520008);
        assert_eq!(response.results[0].geometry.location.lng, 13.404954);
    }

    #[tokio::test]
    async fn empty_results_decode_to_an_empty_list() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"results": [], "status": "ZERO_RESULTS"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = GoogleGeocoder::with_base_url("test-key".to_string(), server.uri());
        let response = client.geocode("Nowhereville").await.expect("request succeeds");

        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn non_json_body_is_a_malformed_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = GoogleGeocoder::with_base_url("test-key".to_string(), server.uri());
        let err = client.geocode("Berlin").await.unwrap_err();

        assert!(matches!(err, ApiError::Malformed { service: "geocoding", .. }));
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;

        let client = GoogleGeocoder::with_base_url("bad-key".to_string(), server.uri());
        let err = client.geocode("Berlin").await.unwrap_err();

        match err {
            ApiError::Status { service, status, body } => {
                assert_eq!(service, "geocoding");
                assert_eq!(status.as_u16(), 403);
                assert_eq!(body, "denied");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
