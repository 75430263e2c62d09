//! SpaceX launch photos (Flickr originals) from the r/SpaceX API

use super::{ImageSource, endpoint, get_json, parse_image_url};
use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Launch fetched when no id is given
pub const DEFAULT_LAUNCH_ID: &str = "latest";

#[derive(Debug, Default, Deserialize)]
struct Launch {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    flickr: Flickr,
}

#[derive(Debug, Default, Deserialize)]
struct Flickr {
    #[serde(default)]
    original: Vec<String>,
}

/// SpaceX launch source
pub struct SpacexLaunchSource {
    client: reqwest::Client,
    base_url: String,
    launch_id: String,
}

impl SpacexLaunchSource {
    /// Create a source for one launch (`latest` or a launch id)
    pub fn new(client: reqwest::Client, config: &Config, launch_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: config.spacex_api_url.clone(),
            launch_id: launch_id.into(),
        }
    }
}

#[async_trait]
impl ImageSource for SpacexLaunchSource {
    fn name(&self) -> &'static str {
        "spacex"
    }

    async fn fetch_image_urls(&self) -> Result<Vec<Url>> {
        let url = endpoint(&self.base_url, &["v5", "launches", &self.launch_id])?;
        let launch: Launch = get_json(&self.client, url).await?;

        if launch.links.flickr.original.is_empty() {
            tracing::warn!(
                launch = %self.launch_id,
                name = launch.name.as_deref().unwrap_or("unknown"),
                "no images found for this launch"
            );
            return Ok(Vec::new());
        }

        launch
            .links
            .flickr
            .original
            .iter()
            .map(|raw| parse_image_url(raw))
            .collect()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fetcher::build_http_client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer, launch_id: &str) -> SpacexLaunchSource {
        let config = Config {
            spacex_api_url: server.uri(),
            ..Default::default()
        };
        SpacexLaunchSource::new(
            build_http_client(Duration::from_secs(5)).unwrap(),
            &config,
            launch_id,
        )
    }

    #[tokio::test]
    async fn returns_flickr_originals() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/launches/5eb87d47ffd86e000604b38a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "CRS-20",
                "links": {
                    "flickr": {
                        "small": [],
                        "original": [
                            "https://live.staticflickr.com/65535/49635401403_96f9c322dc_o.jpg",
                            "https://live.staticflickr.com/65535/49636202657_e81210a3ca_o.jpg"
                        ]
                    }
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let urls = source(&mock_server, "5eb87d47ffd86e000604b38a")
            .fetch_image_urls()
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert_eq!(
            urls[0].as_str(),
            "https://live.staticflickr.com/65535/49635401403_96f9c322dc_o.jpg"
        );
    }

    #[tokio::test]
    async fn launch_without_photos_yields_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/launches/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Starlink",
                "links": {"flickr": {"original": []}}
            })))
            .mount(&mock_server)
            .await;

        let urls = source(&mock_server, DEFAULT_LAUNCH_ID)
            .fetch_image_urls()
            .await
            .unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn missing_links_section_yields_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/launches/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Bare"})))
            .mount(&mock_server)
            .await;

        let urls = source(&mock_server, DEFAULT_LAUNCH_ID)
            .fetch_image_urls()
            .await
            .unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn unknown_launch_is_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/launches/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = source(&mock_server, "nope").fetch_image_urls().await;
        assert!(matches!(result, Err(Error::Http { status: 404, .. })));
    }
}
