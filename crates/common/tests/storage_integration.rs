//! Integration tests for the storage scopes
//!
//! Exercises both backends through the `KeyValueStore` trait object, the way
//! the token store consumes them.

use std::sync::Arc;

use gatehouse_common::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use tempfile::TempDir;

fn backends(dir: &TempDir) -> Vec<Arc<dyn KeyValueStore>> {
    vec![
        Arc::new(MemoryStore::new("session")),
        Arc::new(JsonFileStore::open("persistent", dir.path().join("auth.json")).unwrap()),
    ]
}

/// Both backends agree on basic get/set/remove semantics.
#[test]
fn test_backends_share_semantics() {
    let dir = TempDir::new().unwrap();

    for store in backends(&dir) {
        assert!(store.get("auth_token").unwrap().is_none(), "{}", store.name());

        store.set("auth_token", "a1").unwrap();
        store.set("auth_token", "a2").unwrap();
        assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("a2"));

        store.remove("auth_token").unwrap();
        store.remove("auth_token").unwrap();
        assert!(!store.contains("auth_token").unwrap());
        assert!(store.keys().unwrap().is_empty());
    }
}

/// The persistent scope survives a simulated restart; the session scope does not.
#[test]
fn test_persistent_scope_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("auth.json");

    {
        let persistent = JsonFileStore::open("persistent", &path).unwrap();
        persistent.set("refresh_token", "r1").unwrap();
        let session = MemoryStore::new("session");
        session.set("auth_token", "a1").unwrap();
    }

    let persistent = JsonFileStore::open("persistent", &path).unwrap();
    let session = MemoryStore::new("session");
    assert_eq!(persistent.get("refresh_token").unwrap().as_deref(), Some("r1"));
    assert!(session.get("auth_token").unwrap().is_none());
}
