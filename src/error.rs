//! Error types for space-photos
//!
//! A single [`Error`] enum covers every failure the crate can surface:
//! - configuration problems detected at startup
//! - a missing explicit image in single-shot publishing
//! - transport failures talking to the APIs, image hosts and Telegram
//! - well-formed rejections from those services (HTTP status, Bot API errors)
//!
//! Whether an error is worth retrying is decided in [`crate::retry`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for space-photos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for space-photos
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error{}: {message}", .key.as_ref().map(|k| format!(" ({k})")).unwrap_or_default())]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable or flag that caused the error (e.g., "TELEGRAM_API_KEY")
        key: Option<String>,
    },

    /// Image passed explicitly for single-shot publishing does not exist
    #[error("image {} not found", .0.display())]
    ImageNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from an API or image host
    #[error("HTTP {status} fetching {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL (credentials stripped)
        url: String,
    },

    /// Telegram Bot API rejected the request
    #[error("telegram API error{}: {description}", .code.map(|c| format!(" {c}")).unwrap_or_default())]
    Telegram {
        /// `error_code` from the Bot API reply, when present
        code: Option<i64>,
        /// `description` from the Bot API reply
        description: String,
    },

    /// Response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Process exit code used by the binary when this error is fatal
    ///
    /// A missing explicit image is reported with its own code so wrappers can
    /// tell it apart from configuration or network failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ImageNotFound(_) => 2,
            _ => 1,
        }
    }

    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::ImageNotFound(_) => "image_not_found",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Http { .. } => "http_error",
            Error::Telegram { .. } => "telegram_error",
            Error::InvalidResponse(_) => "invalid_response",
            Error::Serialization(_) => "serialization_error",
            Error::Other(_) => "internal_error",
        }
    }
}

/// Strip the query string from a URL before it ends up in an error or a log
///
/// NASA endpoints carry the API key as a query parameter.
pub(crate) fn redact_url(url: &url::Url) -> String {
    let mut redacted = url.clone();
    redacted.set_query(None);
    redacted.to_string()
}
