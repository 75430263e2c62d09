//! Image sources
//!
//! Each source queries one public API and turns its response into a list of
//! image URLs. Downloading is left to [`ImageFetcher`], so all sources share
//! one way of naming and writing files.
//!
//! - [`ApodSource`] - NASA Astronomy Picture of the Day
//! - [`EpicSource`] - NASA Earth Polychromatic Imaging Camera
//! - [`SpacexLaunchSource`] - Flickr originals of a SpaceX launch

mod apod;
mod epic;
mod spacex;

pub use apod::{ApodQuery, ApodSource, DEFAULT_APOD_COUNT};
pub use epic::EpicSource;
pub use spacex::{DEFAULT_LAUNCH_ID, SpacexLaunchSource};

use crate::error::{Error, Result, redact_url};
use crate::fetcher::ImageFetcher;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use url::Url;

/// A remote API that yields image URLs
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Query the API and return the URLs of the images it currently offers
    async fn fetch_image_urls(&self) -> Result<Vec<Url>>;
}

/// Fetch every image a source offers into `dir`
///
/// Downloads run one after another, in the order the source returned them.
/// The first failed download stops the run and is returned.
pub async fn download_all(
    source: &dyn ImageSource,
    fetcher: &ImageFetcher,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let urls = source.fetch_image_urls().await?;
    tracing::info!(source = source.name(), count = urls.len(), "found images");

    let mut saved = Vec::with_capacity(urls.len());
    for url in &urls {
        let path = fetcher.fetch_and_save(url, dir).await.inspect_err(|e| {
            tracing::error!(source = source.name(), url = %redact_url(url), error = %e, "download failed");
        })?;
        saved.push(path);
    }

    tracing::info!(source = source.name(), dir = %dir.display(), count = saved.len(), "done");
    Ok(saved)
}

/// Parse a base URL and append path segments to it
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| Error::config(format!("invalid API base URL '{base}': {e}"), "api_url"))?;
    url.path_segments_mut()
        .map_err(|()| Error::config(format!("API base URL '{base}' cannot have a path"), "api_url"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// GET a JSON document, mapping non-success statuses to [`Error::Http`]
pub(crate) async fn get_json<T: DeserializeOwned>(client: &reqwest::Client, url: Url) -> Result<T> {
    // reqwest errors embed the URL, which carries the api_key
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| Error::Network(e.without_url()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            url: redact_url(&url),
        });
    }
    let body = response.bytes().await.map_err(|e| Error::Network(e.without_url()))?;
    Ok(serde_json::from_slice(&body)?)
}

/// Parse an image URL taken from an API response
pub(crate) fn parse_image_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidResponse(format!("bad image URL '{raw}': {e}")))
}
