//! In-memory backend used for the session scope

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::error::{StorageError, StorageResult};
use super::traits::KeyValueStore;

/// Process-lifetime store; everything is lost when the process ends.
///
/// An optional byte quota mirrors browser storage limits so callers can see
/// `QuotaExceeded` propagate.
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: String,
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: Mutex::new(BTreeMap::new()), quota_bytes: None }
    }

    /// Store that rejects writes once keys plus values exceed `limit` bytes.
    pub fn with_quota(name: impl Into<String>, limit: usize) -> Self {
        Self { quota_bytes: Some(limit), ..Self::new(name) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn footprint(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock();
        if let Some(limit) = self.quota_bytes {
            let current = footprint(&entries);
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let used = current - replaced + key.len() + value.len();
            if used > limit {
                return Err(StorageError::QuotaExceeded { used, limit });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}
