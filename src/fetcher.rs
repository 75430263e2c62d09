//! Downloading remote images into the image store

use crate::config::Config;
use crate::error::{Error, Result, redact_url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!("space-photos/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the fetcher and the sources
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))
}

/// Downloads images and writes them under a target directory
#[derive(Clone, Debug)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    /// Create a fetcher using the configured request timeout
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(build_http_client(config.http_timeout)?))
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Download `url` and save it as `dir/<last path segment>`
    ///
    /// The directory is created if missing and an existing file with the same
    /// name is overwritten. Returns the path written.
    pub async fn fetch_and_save(&self, url: &Url, dir: &Path) -> Result<PathBuf> {
        let filename = filename_from_url(url).ok_or_else(|| {
            Error::InvalidResponse(format!(
                "cannot derive a file name from URL '{}'",
                redact_url(url)
            ))
        })?;

        tokio::fs::create_dir_all(dir).await?;

        tracing::info!(url = %redact_url(url), "downloading image");
        // reqwest errors embed the URL, which may carry an api_key
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Network(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: redact_url(url),
            });
        }

        let content = response.bytes().await.map_err(|e| Error::Network(e.without_url()))?;
        let path = dir.join(&filename);
        tokio::fs::write(&path, &content).await?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "image saved");
        Ok(path)
    }
}

/// File name of a URL: its last non-empty path segment, percent-decoded
///
/// Query string and fragment are ignored. Returns `None` when the path has
/// no usable segment (e.g. `https://example.com/`).
///
/// # Examples
///
/// ```
/// use space_photos::fetcher::filename_from_url;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/txt/hello%20world.txt?v=9#python").unwrap();
/// assert_eq!(filename_from_url(&url).as_deref(), Some("hello world.txt"));
/// ```
pub fn filename_from_url(url: &Url) -> Option<String> {
    let last_segment = url.path_segments()?.next_back()?;
    if last_segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last_segment).ok()?;
    // A decoded name must not escape the target directory
    if decoded.contains('/') || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded.into_owned())
}

/// File extension of a URL's file name, including the dot
///
/// # Examples
///
/// ```
/// use space_photos::fetcher::file_extension;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/path/to/file.jpg").unwrap();
/// assert_eq!(file_extension(&url).as_deref(), Some(".jpg"));
/// ```
pub fn file_extension(url: &Url) -> Option<String> {
    let filename = filename_from_url(url)?;
    Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}
