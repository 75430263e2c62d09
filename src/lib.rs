//! # space-photos
//!
//! Fetch space imagery from public APIs into a local image tree and publish
//! it to a Telegram channel, one image at a time.
//!
//! ## Pieces
//!
//! - [`sources`] - NASA APOD, NASA EPIC and SpaceX launch adapters
//! - [`fetcher`] - downloads an image URL into a directory
//! - [`store`] - lists the image tree in random order
//! - [`telegram`] - `sendDocument` through the Bot API
//! - [`publisher`] - the publish loop, with retry on transient network errors
//!
//! The fetch side and the publish side never talk to each other; the image
//! directory is the only thing they share.
//!
//! ## Quick Start
//!
//! ```no_run
//! use space_photos::{Config, Publisher, TelegramClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let chat = config.resolve_chat_id(None)?;
//!     let publisher = Publisher::new(TelegramClient::new(&config)?, &config);
//!
//!     publisher.run_unattended(&chat, Duration::from_secs(4 * 3600)).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Image downloading
pub mod fetcher;
/// The publish loop
pub mod publisher;
/// Retry logic for transient failures
pub mod retry;
/// Image API adapters
pub mod sources;
/// Image store scanning
pub mod store;
/// Telegram Bot API client
pub mod telegram;

// Re-export commonly used types
pub use config::{ChatId, Config, RetryConfig};
pub use error::{Error, Result};
pub use fetcher::ImageFetcher;
pub use publisher::Publisher;
pub use retry::IsRetryable;
pub use sources::{ApodQuery, ApodSource, EpicSource, ImageSource, SpacexLaunchSource, download_all};
pub use store::{scan_images, scan_images_in_background};
pub use telegram::{DocumentSender, TelegramClient};

/// Wait for a termination signal.
///
/// - **Unix:** SIGTERM or SIGINT, falling back to Ctrl+C if registration fails.
/// - **Windows/other:** Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration can fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Failed to register SIGINT handler, listening for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Failed to register SIGTERM handler, listening for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal");
        }
        (Err(e1), Err(e2)) => {
            tracing::error!(sigterm_error = %e1, sigint_error = %e2, "Failed to register signal handlers, falling back to Ctrl+C");
            wait_for_ctrl_c().await;
        }
    }
}

/// Wait for a termination signal (Ctrl+C on non-Unix platforms).
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C, waiting forever");
            std::future::pending::<()>().await;
        }
    }
}
