//! Controllable clock for deterministic tests

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::time::Clock;

/// Mock clock for deterministic testing
///
/// Starts at a fixed instant and only moves when advanced. Clones share the
/// same underlying time.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use gatehouse_common::testing::MockClock;
/// use gatehouse_common::time::Clock;
///
/// let clock = MockClock::new();
/// let start = clock.now();
/// clock.advance(Duration::days(31));
/// assert_eq!(clock.now() - start, Duration::days(31));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Clock frozen at the current real time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { current: Arc::new(Mutex::new(instant)) }
    }

    /// Simulate time passing without waiting
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock();
        *current += duration;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock() = instant;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}
