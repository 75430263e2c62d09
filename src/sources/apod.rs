//! NASA Astronomy Picture of the Day

use super::{ImageSource, endpoint, get_json, parse_image_url};
use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use url::Url;

/// Number of random pictures requested when no date is given
pub const DEFAULT_APOD_COUNT: u32 = 30;

/// What to ask the APOD endpoint for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApodQuery {
    /// `count` random pictures
    Count(u32),
    /// The picture of one specific day
    Date(NaiveDate),
}

impl Default for ApodQuery {
    fn default() -> Self {
        ApodQuery::Count(DEFAULT_APOD_COUNT)
    }
}

/// One APOD entry; only the fields needed to pick images
#[derive(Debug, Deserialize)]
struct ApodEntry {
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// `count` queries return a list, `date` queries a single object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApodResponse {
    Many(Vec<ApodEntry>),
    One(ApodEntry),
}

/// NASA APOD source
pub struct ApodSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    query: ApodQuery,
}

impl ApodSource {
    /// Create an APOD source; fails if no NASA API key is configured
    pub fn new(client: reqwest::Client, config: &Config, query: ApodQuery) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.nasa_api_url.clone(),
            api_key: config.nasa_api_key()?.to_string(),
            query,
        })
    }

    fn request_url(&self) -> Result<Url> {
        let mut url = endpoint(&self.base_url, &["planetary", "apod"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            match self.query {
                ApodQuery::Count(count) => pairs.append_pair("count", &count.to_string()),
                ApodQuery::Date(date) => pairs.append_pair("date", &date.format("%Y-%m-%d").to_string()),
            };
        }
        Ok(url)
    }
}

#[async_trait]
impl ImageSource for ApodSource {
    fn name(&self) -> &'static str {
        "nasa_apod"
    }

    async fn fetch_image_urls(&self) -> Result<Vec<Url>> {
        let entries = match get_json::<ApodResponse>(&self.client, self.request_url()?).await? {
            ApodResponse::Many(entries) => entries,
            ApodResponse::One(entry) => vec![entry],
        };

        let mut urls = Vec::new();
        for entry in entries {
            let title = entry.title.as_deref().unwrap_or("untitled");
            match (entry.media_type.as_deref(), entry.url.as_deref()) {
                (Some("image"), Some(raw)) => urls.push(parse_image_url(raw)?),
                (Some("image"), None) => {
                    tracing::warn!(title, "APOD image entry without url, skipping");
                }
                (media_type, _) => {
                    tracing::info!(title, media_type = media_type.unwrap_or("unknown"), "skipping non-image media type");
                }
            }
        }
        Ok(urls)
    }
}
