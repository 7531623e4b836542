//! JSON file backend used for the persistent scope
//!
//! The whole map is rewritten on every mutation through a temp file and an
//! atomic rename, so a crash never leaves a half-written store behind.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::traits::KeyValueStore;

#[derive(Debug)]
pub struct JsonFileStore {
    name: String,
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    /// Returns `StorageError::Corrupt` if the file exists but is not a JSON
    /// object of strings, or `StorageError::Io` if it cannot be read.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "opened persistent store");

        Ok(Self { name: name.into(), path, entries: Mutex::new(entries) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        let mut file = owner_only().write(true).create(true).truncate(true).open(&tmp)?;
        file.write_all(&serde_json::to_vec_pretty(entries)?)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate<F>(&self, apply: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        if !apply(&mut next) {
            return Ok(());
        }
        // Memory only changes once the file write succeeded.
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Credentials live in this file; keep it readable by the owner only.
fn owner_only() -> OpenOptions {
    let mut options = OpenOptions::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

impl KeyValueStore for JsonFileStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}
