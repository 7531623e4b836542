//! Storage scopes backing the token store
//!
//! - [`MemoryStore`]: session scope, process lifetime
//! - [`JsonFileStore`]: persistent scope, survives restarts
//!
//! Both implement [`KeyValueStore`]; errors are [`StorageError`] and are never
//! swallowed by this layer.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
