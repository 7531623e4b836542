//! Key-value backend abstraction
//!
//! A storage scope is a named string-to-string store. The token store owns
//! two of them (session and persistent) and decides which one is active.

use super::error::StorageResult;

/// Synchronous string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored
    fn keys(&self) -> StorageResult<Vec<String>>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
