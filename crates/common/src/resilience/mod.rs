//! Resilience patterns for transient failures
//!
//! - **Retry**: bounded attempts with a fixed inter-attempt delay; the caller
//!   decides which errors are retryable through [`RetryPolicy`].

pub mod retry;

pub use retry::{RetryConfig, RetryDecision, RetryExecutor, RetryOutcome, RetryPolicy};
