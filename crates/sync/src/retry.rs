//! Timeout-and-retry wrapper for upstream requests.
//!
//! Every upstream call runs under [`SyncConfig::page_timeout`]. Failures are
//! retried [`SyncConfig::page_retries`] times with exponential backoff,
//! doubling from `retry_base_delay` up to `retry_max_delay`. Errors that
//! are not [transient](UpstreamError::is_transient) end the loop at once.
//!
//! [`before_deadline`] caps the upstream work of a whole sync run.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::SyncConfig;
use crate::error::UpstreamError;

/// Calculate the next backoff delay, clamped to `max`.
pub fn next_delay(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// Run `call` until it succeeds, fails permanently, or the retry budget is
/// spent.
///
/// `what` labels the request in logs. The last error is returned when every
/// attempt fails.
pub async fn with_retry<T, F, Fut>(
    config: &SyncConfig,
    place_id: &str,
    what: &str,
    mut call: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut delay = config.retry_base_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = match tokio::time::timeout(config.page_timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(config.page_timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt <= config.page_retries => {
                tracing::warn!(
                    place_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "{what} failed, retrying",
                );
                tokio::time::sleep(delay).await;
                delay = next_delay(delay, config.retry_max_delay);
            }
            Err(e) if e.is_transient() => {
                tracing::error!(place_id, attempt, error = %e, "{what} failed after all retries");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(place_id, attempt, error = %e, "{what} failed, not retrying");
                return Err(e);
            }
        }
    }
}

/// Await `work`, giving up at `deadline`.
///
/// `budget` is the full allowance the deadline was computed from and only
/// labels the error.
pub async fn before_deadline<T, Fut>(
    deadline: Instant,
    budget: Duration,
    work: Fut,
) -> Result<T, UpstreamError>
where
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    match tokio::time::timeout_at(deadline, work).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::DeadlineExceeded(budget)),
    }
}
