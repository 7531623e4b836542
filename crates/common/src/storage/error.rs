//! Storage error types
//!
//! Backend failures are not recoverable at the token-store level: they are
//! propagated to the call site instead of being swallowed.

use gatehouse_domain::GatehouseError;
use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded: {used} of {limit} bytes")]
    QuotaExceeded { used: usize, limit: usize },

    #[error("Corrupt store at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for GatehouseError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
