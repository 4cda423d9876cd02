use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{WebcamApi, WebcamEntry, WebcamListResponse, read_json};
use crate::error::ApiError;

const SERVICE: &str = "webcams";
const DEFAULT_BASE_URL: &str = "https://webcamstravel.p.mashape.com";
const API_KEY_HEADER: &str = "X-Mashape-Key";

/// webcams.travel client (Mashape gateway).
#[derive(Debug, Clone)]
pub struct WebcamsTravel {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WebcamsTravel {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }
}

#[async_trait]
impl WebcamApi for WebcamsTravel {
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: u32,
    ) -> Result<Vec<WebcamEntry>, ApiError> {
        // The nearby filter is part of the path, not the query string.
        let url = format!("{}/webcams/list/nearby={lat},{lng},{radius_km}", self.base_url);
        debug!("WEBCAMS: lat={lat} lng={lng} radius_km={radius_km}");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("show", "webcams:location,image,url"),
                ("orderby", "popularity"),
            ])
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await
            .map_err(|source| ApiError::Transport { service: SERVICE, source })?;

        let response: WebcamListResponse = read_json(SERVICE, res).await?;
        Ok(response.result.webcams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_nearby_webcams() {
        let server = MockServer::start().await;
        let body = r#"{
            "result": {
                "webcams": [
                    {
                        "title": "Harbor",
                        "image": {"current": {"thumbnail": "t.jpg", "preview": "p.jpg"}},
                        "url": {"current": {"mobile": "https://example.com/cam"}},
                        "update": 1700000000,
                        "location": {"timezone": "Europe/Berlin"}
                    }
                ]
            }
        }"#;

        Mock::given(method("GET"))
            .and(path("/webcams/list/nearby=52.5,13.4,30"))
            .and(query_param("orderby", "popularity"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = WebcamsTravel::with_base_url("test-key".to_string(), server.uri());
        let webcams = client.nearby(52.5, 13.4, 30).await.expect("request succeeds");

        assert_eq!(webcams.len(), 1);
        assert_eq!(webcams[0].title, "Harbor");
        assert_eq!(webcams[0].image.current.preview, "p.jpg");
    }

    #[tokio::test]
    async fn empty_webcam_list_is_ok() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"result": {"webcams": []}}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = WebcamsTravel::with_base_url("test-key".to_string(), server.uri());
        let webcams = client.nearby(0.0, 0.0, 30).await.expect("request succeeds");

        assert!(webcams.is_empty());
    }
}
