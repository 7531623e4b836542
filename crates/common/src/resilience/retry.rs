//! Bounded fixed-delay retry
//!
//! The console's request policy is deliberately simple: a fixed attempt
//! ceiling and a fixed pause between attempts, no backoff growth and no
//! jitter. Which failures are worth repeating is decided by a
//! [`RetryPolicy`] supplied by the caller.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Stop,
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

impl<E, F> RetryPolicy<E> for F
where
    F: Fn(&E, u32) -> RetryDecision,
{
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
        self(error, attempt)
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, initial try included
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl RetryConfig {
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), delay }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::fixed(3, Duration::from_millis(1000))
    }
}

/// Outcome of a retry execution including result and attempt count.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Runs an operation under a [`RetryConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> RetryConfig {
        self.config
    }

    /// Run `operation` until it succeeds, the policy says stop, or the
    /// attempt ceiling is reached. The last error is returned unchanged.
    pub async fn execute<T, E, F, Fut, P>(&self, mut operation: F, policy: &P) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: RetryPolicy<E> + ?Sized,
        E: std::fmt::Display,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation succeeded after retry");
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt };
                }
                Err(error) => {
                    let decision = policy.should_retry(&error, attempt);
                    if decision == RetryDecision::Stop || attempt >= max_attempts {
                        return RetryOutcome { result: Err(error), attempts: attempt };
                    }

                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = self.config.delay.as_millis() as u64,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    if !self.config.delay.is_zero() {
                        tokio::time::sleep(self.config.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
