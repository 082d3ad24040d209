use crate::utils::time::sleep_with_jitter;
use common::config::RetryConfig;
use common::{Error, Result};
use std::future::Future;
use tracing::warn;

/// Bounded exponential backoff shared by every upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            jitter: true,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// Runs `operation`, retrying the failures `Error::is_transient` accepts.
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        retry_with_backoff(self, Error::is_transient, operation).await
    }
}

/// Retries `operation` while `is_transient` classifies its error as retryable.
///
/// Non-transient errors are returned untouched on first sight. Once
/// `max_attempts` calls have failed the last error is wrapped in
/// [`Error::UpstreamExhausted`].
pub async fn retry_with_backoff<T, F, Fut, C>(
    policy: &RetryPolicy,
    is_transient: C,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&Error) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.base_delay_ms;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !is_transient(&e) => return Err(e),
            Err(e) => {
                if attempt >= max_attempts {
                    return Err(Error::UpstreamExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }

                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay,
                    error = %e,
                    "Transient upstream failure, backing off"
                );
                let jitter = if policy.jitter { delay / 2 } else { 0 };
                sleep_with_jitter(delay, jitter).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}
