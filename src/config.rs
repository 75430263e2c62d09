//! Configuration types for space-photos
//!
//! [`Config`] is built once at startup (usually from the process environment
//! after `.env` has been loaded) and handed to every component by reference.
//! Nothing else in the crate reads environment variables.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

/// Environment variable holding the Telegram bot token
pub const TELEGRAM_API_KEY: &str = "TELEGRAM_API_KEY";
/// Environment variable holding the default publish target
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
/// Environment variable overriding the Bot API base URL
pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
/// Environment variable holding the NASA API key
pub const NASA_API_KEY: &str = "NASA_API_KEY";
/// Environment variable for the images root scanned by the publisher
pub const IMAGES_DIRECTORY: &str = "IMAGES_DIRECTORY";
/// Environment variable for the APOD download directory
pub const NASA_APOD_IMAGES_PATH: &str = "NASA_APOD_IMAGES_PATH";
/// Environment variable for the EPIC download directory
pub const NASA_EPIC_IMAGES_PATH: &str = "NASA_EPIC_IMAGES_PATH";
/// Environment variable for the SpaceX download directory
pub const NASA_SPACEX_IMAGES_PATH: &str = "NASA_SPACEX_IMAGES_PATH";

/// Retry policy for sending a single image
///
/// The default retries forever with a fixed one second pause. `max_attempts`
/// exists so callers (and tests) can bound the number of attempts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Pause between attempts (default: 1 second)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub delay: Duration,

    /// Total number of attempts before giving up (default: None = unlimited)
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay: default_retry_delay(),
            max_attempts: None,
        }
    }
}

/// Main configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telegram bot token, required for publishing
    #[serde(default)]
    pub telegram_token: Option<String>,

    /// Default publish target, used when no `--chat_id` is given
    #[serde(default)]
    pub telegram_chat_id: Option<String>,

    /// NASA API key, required for the APOD and EPIC sources
    #[serde(default)]
    pub nasa_api_key: Option<String>,

    /// Images root scanned by the publisher (default: "images")
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// APOD download directory (default: "images/nasa_apod")
    #[serde(default = "default_apod_dir")]
    pub apod_dir: PathBuf,

    /// EPIC download directory (default: "images/nasa_epic")
    #[serde(default = "default_epic_dir")]
    pub epic_dir: PathBuf,

    /// SpaceX download directory (default: "images/spacex")
    #[serde(default = "default_spacex_dir")]
    pub spacex_dir: PathBuf,

    /// Bot API base URL (default: "https://api.telegram.org")
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// NASA API base URL (default: "https://api.nasa.gov")
    #[serde(default = "default_nasa_api_url")]
    pub nasa_api_url: String,

    /// SpaceX API base URL (default: "https://api.spacexdata.com")
    #[serde(default = "default_spacex_api_url")]
    pub spacex_api_url: String,

    /// Timeout for every outbound HTTP request (default: 30 seconds)
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub http_timeout: Duration,

    /// Retry policy for sends
    #[serde(default)]
    pub retry: RetryConfig,

    /// Pause before re-scanning an empty image store (default: 60 seconds)
    #[serde(default = "default_rescan_interval", with = "duration_serde")]
    pub rescan_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_token: None,
            telegram_chat_id: None,
            nasa_api_key: None,
            images_dir: default_images_dir(),
            apod_dir: default_apod_dir(),
            epic_dir: default_epic_dir(),
            spacex_dir: default_spacex_dir(),
            telegram_api_url: default_telegram_api_url(),
            nasa_api_url: default_nasa_api_url(),
            spacex_api_url: default_spacex_api_url(),
            http_timeout: default_http_timeout(),
            retry: RetryConfig::default(),
            rescan_interval: default_rescan_interval(),
        }
    }
}

// Secrets stay out of debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "***"))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("nasa_api_key", &self.nasa_api_key.as_ref().map(|_| "***"))
            .field("images_dir", &self.images_dir)
            .field("apod_dir", &self.apod_dir)
            .field("epic_dir", &self.epic_dir)
            .field("spacex_dir", &self.spacex_dir)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("nasa_api_url", &self.nasa_api_url)
            .field("spacex_api_url", &self.spacex_api_url)
            .field("http_timeout", &self.http_timeout)
            .field("retry", &self.retry)
            .field("rescan_interval", &self.rescan_interval)
            .finish()
    }
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            telegram_token: get(TELEGRAM_API_KEY),
            telegram_chat_id: get(TELEGRAM_CHAT_ID),
            nasa_api_key: get(NASA_API_KEY),
            images_dir: get(IMAGES_DIRECTORY)
                .map(PathBuf::from)
                .unwrap_or(defaults.images_dir),
            apod_dir: get(NASA_APOD_IMAGES_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.apod_dir),
            epic_dir: get(NASA_EPIC_IMAGES_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.epic_dir),
            spacex_dir: get(NASA_SPACEX_IMAGES_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.spacex_dir),
            telegram_api_url: get(TELEGRAM_API_URL).unwrap_or(defaults.telegram_api_url),
            ..defaults
        }
    }

    /// Telegram bot token, or a configuration error if it is not set
    pub fn telegram_token(&self) -> Result<&str> {
        self.telegram_token
            .as_deref()
            .ok_or_else(|| Error::config("Telegram bot token is not set", TELEGRAM_API_KEY))
    }

    /// NASA API key, or a configuration error if it is not set
    pub fn nasa_api_key(&self) -> Result<&str> {
        self.nasa_api_key
            .as_deref()
            .ok_or_else(|| Error::config("NASA API key is not set", NASA_API_KEY))
    }

    /// Resolve the publish target: explicit override first, then the configured default
    pub fn resolve_chat_id(&self, explicit: Option<&str>) -> Result<ChatId> {
        match explicit {
            Some(id) => id.parse().map_err(|e: Error| match e {
                Error::Config { message, .. } => Error::config(message, "--chat_id"),
                other => other,
            }),
            None => self
                .telegram_chat_id
                .as_deref()
                .ok_or_else(|| {
                    Error::config(
                        "no publish target: pass --chat_id or set TELEGRAM_CHAT_ID",
                        TELEGRAM_CHAT_ID,
                    )
                })?
                .parse(),
        }
    }
}

/// Telegram chat or channel identifier (`@channel_name` or a numeric id)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(String);

impl ChatId {
    /// The identifier as sent to the Bot API
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChatId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim();
        if id.is_empty() {
            return Err(Error::config("chat id is empty", TELEGRAM_CHAT_ID));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(Error::config(
                format!("chat id '{id}' contains whitespace"),
                TELEGRAM_CHAT_ID,
            ));
        }
        Ok(Self(id.to_string()))
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert a delay given in hours into a [`Duration`]
///
/// Rejects negative and non-finite values.
pub fn hours_to_duration(hours: f64) -> Result<Duration> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(Error::config(
            format!("delay must be a non-negative number of hours, got {hours}"),
            "--hours",
        ));
    }
    Duration::try_from_secs_f64(hours * 3600.0)
        .map_err(|e| Error::config(format!("delay of {hours} hours is out of range: {e}"), "--hours"))
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_apod_dir() -> PathBuf {
    PathBuf::from("images/nasa_apod")
}

fn default_epic_dir() -> PathBuf {
    PathBuf::from("images/nasa_epic")
}

fn default_spacex_dir() -> PathBuf {
    PathBuf::from("images/spacex")
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_nasa_api_url() -> String {
    "https://api.nasa.gov".to_string()
}

fn default_spacex_api_url() -> String {
    "https://api.spacexdata.com".to_string()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_rescan_interval() -> Duration {
    Duration::from_secs(60)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
