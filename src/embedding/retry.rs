//! Generic retry with exponential backoff
//!
//! The policy is independent of any particular provider call: callers supply
//! the retryable-error predicate and a [`Sleeper`], so the behavior is unit
//! testable without real waiting or I/O.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Retry policy: attempt budget plus exponential backoff base.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_retries: usize,
    /// Backoff for attempt `n` is `base_delay * 2^n`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Backoff delay before the retry following failed attempt `attempt`
    /// (0-based).
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt as u32)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Sleep abstraction so backoff and pacing delays can be observed in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer; blocks only the calling
/// task.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Outcome of an exhausted or non-retryable operation.
#[derive(Error, Debug)]
pub enum RetryError<E: std::fmt::Display + std::fmt::Debug> {
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: usize, last: E },

    #[error("{0}")]
    Fatal(E),
}

/// Run `op`, retrying failures that satisfy `is_retryable` with exponential
/// backoff per `policy`. Non-retryable failures propagate on first
/// occurrence; the final retryable failure is reported with the attempt
/// count and the last underlying error.
pub async fn call_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + std::fmt::Debug,
{
    let attempts = policy.max_retries.max(1);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(RetryError::Exhausted {
                        attempts,
                        last: err,
                    });
                }
                let delay = policy.backoff_delay(attempt - 1);
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retryable failure, backing off: {err}"
                );
                sleeper.sleep(delay).await;
            }
            Err(err) => return Err(RetryError::Fatal(err)),
        }
    }
}
