//! Runtime building blocks shared across Gatehouse crates.
//!
//! - [`storage`]: key-value scopes (memory and JSON file backends)
//! - [`time`]: wall-clock abstraction
//! - [`sync`]: single-flight lease
//! - [`resilience`]: bounded fixed-delay retry
//! - [`testing`]: mocks for the above

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
pub mod storage;
pub mod sync;
pub mod time;

// Testing utilities
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
pub use resilience::{RetryConfig, RetryDecision, RetryExecutor, RetryOutcome, RetryPolicy};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use sync::SingleFlight;
pub use time::{Clock, SystemClock};
