//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

#![allow(clippy::missing_errors_doc)]

use std::sync::atomic::{AtomicBool, Ordering};

use crate::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};

/// Store whose writes can be switched to fail, simulating disabled storage.
///
/// Reads keep working so tests can assert on state after a failed write.
#[derive(Debug)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new(name: &str) -> Self {
        Self { inner: MemoryStore::new(name), fail_writes: AtomicBool::new(false) }
    }

    /// A store that rejects every write from the start
    pub fn disabled(name: &str) -> Self {
        let store = Self::new(name);
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("{} is disabled", self.inner.name())));
        }
        Ok(())
    }
}

impl KeyValueStore for FailingStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys()
    }
}
