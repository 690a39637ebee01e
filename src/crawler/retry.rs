//! Retry with exponential back-off and jitter
//!
//! A request gets a fixed number of total attempts. Errors that a fresh
//! attempt cannot fix (see [`RippleError::is_retryable`]) end the request at once.

use crate::config::CrawlerConfig;
use crate::RippleError;
use std::future::Future;
use std::time::Duration;

/// Upper bound on a single back-off sleep
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// How many attempts a request gets and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Back-off after the first failed attempt; doubles after each further failure
    pub base_backoff: Duration,
}

/// The last error of a request that ran out of attempts
#[derive(Debug)]
pub struct Exhausted {
    pub attempts: u32,
    pub error: RippleError,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            base_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Back-off before the attempt following failure number `failures`
    ///
    /// `base × 2^(failures-1)`, capped, then scaled by a random factor in
    /// `[0.75, 1.25)`.
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(10);
        let computed = self.base_backoff.saturating_mul(1u32 << exponent);
        computed
            .min(MAX_BACKOFF)
            .mul_f64(rand::random_range(0.75..1.25))
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are used up
///
/// # Arguments
///
/// * `policy` - Attempt budget and back-off
/// * `url` - The request URL, for logging
/// * `operation` - Called with the 1-based attempt number
///
/// # Returns
///
/// * `Ok(T)` - The first successful attempt's value
/// * `Err(Exhausted)` - The last error and how many attempts were made
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    mut operation: F,
) -> Result<T, Exhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RippleError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !error.is_retryable() || attempt >= max_attempts {
                    return Err(Exhausted {
                        attempts: attempt,
                        error,
                    });
                }

                let delay = policy.backoff(attempt);
                tracing::warn!(
                    url,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Request failed, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
