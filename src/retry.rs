//! Bounded retry with exponential backoff
//!
//! Upstream registries rate-limit aggressively and occasionally return 5xx;
//! retries back off exponentially so they do not amplify load, while true
//! client errors fail fast instead of masking caller mistakes as transient.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Error;

/// Runs `operation` up to `max_attempts` times (total tries, not retries).
///
/// A fatal error, see [`Error::is_retryable`], aborts immediately and
/// propagates as-is. A retryable error sleeps `base_delay * 2^(attempt-1)`
/// and tries again; the last attempt's error is surfaced unchanged. Purely
/// sequential: no jitter, no racing of concurrent attempts.
pub async fn with_retry<T, F, Fut>(
    mut operation: F,
    max_attempts: u32,
    base_delay: Duration,
    context: &str,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => {
                debug!("{context}: fatal error, not retrying: {err}");
                return Err(err);
            }
            Err(err) if attempt >= max_attempts => {
                warn!("{context}: giving up after {attempt} attempts: {err}");
                return Err(err);
            }
            Err(err) => {
                let delay = base_delay * 2u32.pow(attempt - 1);
                debug!("{context}: attempt {attempt} failed ({err}), retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
