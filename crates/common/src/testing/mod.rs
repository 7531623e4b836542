//! Test utilities shared by the Gatehouse crates

pub mod mocks;
pub mod time;

pub use mocks::FailingStore;
pub use time::MockClock;
