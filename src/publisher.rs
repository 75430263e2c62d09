//! Publishing images from the store to a Telegram channel
//!
//! One image is in flight at a time. A send that fails with a transient
//! network error is repeated for the same image after a fixed pause (see
//! [`crate::retry`]); any other error ends the run.
//!
//! The unattended loop re-scans the store before every pass, so images added
//! while it runs are picked up and every pass has a fresh random order.
//! Images are not tracked between passes: an image already published can be
//! chosen again later.

use crate::config::{ChatId, Config, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::retry_until_success;
use crate::store::scan_images_in_background;
use crate::telegram::DocumentSender;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Instrument;

/// Sends images from the store through a [`DocumentSender`]
pub struct Publisher<S> {
    sender: S,
    retry: RetryConfig,
    images_dir: PathBuf,
    rescan_interval: Duration,
}

impl<S: DocumentSender> Publisher<S> {
    /// Create a publisher over the configured images directory
    pub fn new(sender: S, config: &Config) -> Self {
        Self {
            sender,
            retry: config.retry.clone(),
            images_dir: config.images_dir.clone(),
            rescan_interval: config.rescan_interval,
        }
    }

    /// Send one image, once
    pub async fn publish(&self, image: &Path, target: &ChatId) -> Result<()> {
        self.sender.send_document(target, image).await
    }

    /// Send one image, repeating on transient network failures until it goes through
    pub async fn publish_with_retry(&self, image: &Path, target: &ChatId) -> Result<()> {
        let span = tracing::info_span!("publish", path = %image.display(), chat = %target);
        retry_until_success(&self.retry, || self.publish(image, target))
            .instrument(span)
            .await
            .inspect(|_| tracing::info!(path = %image.display(), "image published"))
            .inspect_err(|e| {
                tracing::error!(path = %image.display(), code = e.error_code(), error = %e, "failed to publish image")
            })
    }

    /// Publish a single explicitly chosen image
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageNotFound`] without sending anything if the file
    /// does not exist.
    pub async fn run_once(&self, image: &Path, target: &ChatId) -> Result<()> {
        if !tokio::fs::try_exists(image).await? {
            tracing::error!(path = %image.display(), "image not found");
            return Err(Error::ImageNotFound(image.to_path_buf()));
        }
        self.publish_with_retry(image, target).await
    }

    /// One pass over a fresh, shuffled snapshot of the store
    ///
    /// Sleeps `delay` after every image. An empty store sleeps the rescan
    /// interval instead. Returns the number of images published.
    pub async fn run_pass(&self, target: &ChatId, delay: Duration) -> Result<usize> {
        let images = scan_images_in_background(&self.images_dir).await?;

        if images.is_empty() {
            tracing::warn!(
                dir = %self.images_dir.display(),
                retry_in_secs = self.rescan_interval.as_secs(),
                "no images to publish"
            );
            tokio::time::sleep(self.rescan_interval).await;
            return Ok(0);
        }

        tracing::info!(count = images.len(), "starting publish pass");
        for image in &images {
            self.publish_with_retry(image, target).await?;
            tokio::time::sleep(delay).await;
        }
        Ok(images.len())
    }

    /// Publish the store forever, `delay` apart
    ///
    /// Only returns on a non-transient error.
    pub async fn run_unattended(&self, target: &ChatId, delay: Duration) -> Result<Infallible> {
        tracing::info!(
            dir = %self.images_dir.display(),
            chat = %target,
            delay_secs = delay.as_secs_f64(),
            "publishing images"
        );
        loop {
            self.run_pass(target, delay).await?;
        }
    }
}
