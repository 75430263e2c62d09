//! Retry logic for transient network failures
//!
//! Sends are retried with a fixed pause until they succeed. There is no
//! exponential backoff and, by default, no attempt limit: a network that never
//! comes back keeps the caller waiting on the same unit of work.
//!
//! The executor is a two-state machine. [`RetryState::Attempting`] runs the
//! operation; an error moves it back to `Attempting` only when the error
//! [is retryable](IsRetryable) and the optional attempt bound allows another
//! try. Anything else leaves the machine with the error.
//!
//! # Example
//!
//! ```no_run
//! use space_photos::retry::{IsRetryable, retry_until_success};
//! use space_photos::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! retry_until_success(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use std::future::Future;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, connection reset, DNS failure) should return `true`.
/// Permanent failures (bad credentials, malformed request, missing file) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Transport-level failures: timeouts, refused/reset connections, DNS
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Gateway failures and flood control on the Bot API side clear up on their own
            Error::Telegram { code: Some(code), .. } => is_transient_status(*code),
            // The server answered; asking again will not change its mind
            Error::Http { .. } | Error::Telegram { .. } | Error::InvalidResponse(_) => false,
            Error::Config { .. } => false,
            Error::ImageNotFound(_) => false,
            Error::Serialization(_) => false,
            Error::Other(_) => false,
        }
    }
}

/// 429 and 5xx replies; any other status is a verdict on the request itself
fn is_transient_status(code: i64) -> bool {
    code == 429 || (500..600).contains(&code)
}

/// State of a retried operation
#[derive(Debug)]
pub enum RetryState<T> {
    /// About to run attempt number `attempt` (1-based)
    Attempting {
        /// Attempt number
        attempt: u32,
    },
    /// The operation returned a value
    Succeeded(T),
}

/// Run an async operation until it succeeds
///
/// Retryable errors are logged and followed by a pause of `config.delay`
/// before the same operation runs again. Non-retryable errors are returned
/// immediately, without a pause. When `config.max_attempts` is set and
/// reached, the last retryable error is returned.
pub async fn retry_until_success<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut state = RetryState::Attempting { attempt: 1 };

    loop {
        state = match state {
            RetryState::Succeeded(value) => return Ok(value),
            RetryState::Attempting { attempt } => match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempts = attempt, "operation succeeded after retry");
                    }
                    RetryState::Succeeded(value)
                }
                Err(e) if e.is_retryable() && may_retry(config, attempt) => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        delay_ms = config.delay.as_millis(),
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(config.delay).await;
                    RetryState::Attempting {
                        attempt: attempt.saturating_add(1),
                    }
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::error!(
                            error = %e,
                            attempts = attempt,
                            "operation failed after all retry attempts exhausted"
                        );
                    } else {
                        tracing::error!(error = %e, "operation failed with non-retryable error");
                    }
                    return Err(e);
                }
            },
        };
    }
}

fn may_retry(config: &RetryConfig, attempt: u32) -> bool {
    config.max_attempts.is_none_or(|max| attempt < max)
}
