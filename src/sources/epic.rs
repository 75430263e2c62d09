//! NASA EPIC (Earth Polychromatic Imaging Camera) natural-color images

use super::{ImageSource, endpoint, get_json};
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime};
use serde::Deserialize;
use url::Url;

/// Format of the `date` field in EPIC metadata, e.g. `2024-01-02 00:31:45`
const EPIC_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct EpicEntry {
    /// Image name without extension, e.g. `epic_1b_20240102003633`
    image: String,
    date: String,
}

/// NASA EPIC source
pub struct EpicSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EpicSource {
    /// Create an EPIC source; fails if no NASA API key is configured
    pub fn new(client: reqwest::Client, config: &Config) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.nasa_api_url.clone(),
            api_key: config.nasa_api_key()?.to_string(),
        })
    }

    /// Archive URL of one image, keyed by the day it was taken
    fn archive_url(&self, entry: &EpicEntry) -> Result<Url> {
        let taken = NaiveDateTime::parse_from_str(&entry.date, EPIC_DATE_FORMAT).map_err(|e| {
            Error::InvalidResponse(format!(
                "EPIC image {} has unparseable date '{}': {e}",
                entry.image, entry.date
            ))
        })?;

        let year = taken.year().to_string();
        let month = format!("{:02}", taken.month());
        let day = format!("{:02}", taken.day());
        let file = format!("{}.png", entry.image);

        let mut url = endpoint(
            &self.base_url,
            &["EPIC", "archive", "natural", &year, &month, &day, "png", &file],
        )?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl ImageSource for EpicSource {
    fn name(&self) -> &'static str {
        "nasa_epic"
    }

    async fn fetch_image_urls(&self) -> Result<Vec<Url>> {
        let mut url = endpoint(&self.base_url, &["EPIC", "api", "natural"])?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);

        let entries: Vec<EpicEntry> = get_json(&self.client, url).await?;
        entries.iter().map(|entry| self.archive_url(entry)).collect()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::build_http_client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> EpicSource {
        let config = Config {
            nasa_api_key: Some("TESTKEY".into()),
            nasa_api_url: server.uri(),
            ..Default::default()
        };
        EpicSource::new(build_http_client(Duration::from_secs(5)).unwrap(), &config).unwrap()
    }

    #[tokio::test]
    async fn builds_archive_urls_from_metadata() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/EPIC/api/natural"))
            .and(query_param("api_key", "TESTKEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"identifier": "20240102003633", "image": "epic_1b_20240102003633", "caption": "x", "date": "2024-01-02 00:31:45"},
                {"identifier": "20241130120000", "image": "epic_1b_20241130120000", "caption": "y", "date": "2024-11-30 12:00:00"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let urls = source(&mock_server).fetch_image_urls().await.unwrap();

        let base = mock_server.uri();
        assert_eq!(
            urls[0].as_str(),
            format!("{base}/EPIC/archive/natural/2024/01/02/png/epic_1b_20240102003633.png?api_key=TESTKEY")
        );
        assert_eq!(
            urls[1].as_str(),
            format!("{base}/EPIC/archive/natural/2024/11/30/png/epic_1b_20241130120000.png?api_key=TESTKEY")
        );
        assert_eq!(
            crate::fetcher::filename_from_url(&urls[0]).as_deref(),
            Some("epic_1b_20240102003633.png")
        );
    }

    #[tokio::test]
    async fn empty_metadata_yields_no_urls() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/EPIC/api/natural"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        assert!(source(&mock_server).fetch_image_urls().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_date_is_invalid_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/EPIC/api/natural"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"image": "epic_1b_x", "date": "yesterday"}
            ])))
            .mount(&mock_server)
            .await;

        let result = source(&mock_server).fetch_image_urls().await;
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn non_list_body_is_serialization_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/EPIC/api/natural"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
            .mount(&mock_server)
            .await;

        let result = source(&mock_server).fetch_image_urls().await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn unreachable_api_is_retryable_and_hides_api_key() {
        use crate::retry::IsRetryable;

        let config = Config {
            nasa_api_key: Some("SUPERSECRETKEY".into()),
            nasa_api_url: "http://127.0.0.1:1".into(),
            ..Default::default()
        };
        let source =
            EpicSource::new(build_http_client(Duration::from_secs(5)).unwrap(), &config).unwrap();

        let err = source.fetch_image_urls().await.unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_retryable());
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{err}");
        assert!(!format!("{err:?}").contains("SUPERSECRETKEY"));
    }

    #[test]
    fn requires_api_key() {
        let client = build_http_client(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            EpicSource::new(client, &Config::default()),
            Err(Error::Config { .. })
        ));
    }
}
