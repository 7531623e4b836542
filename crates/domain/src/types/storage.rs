//! Storage scope selection

use serde::{Deserialize, Serialize};

/// Persistence boundary for credentials
///
/// Exactly one scope is active per session. It is chosen at login through the
/// "remember me" flag and stays fixed until the next login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    /// Cleared when the owning process / browsing context ends
    #[default]
    Session,
    /// Survives restarts
    Persistent,
}

crate::impl_domain_status_conversions!(StorageScope {
    Session => "session",
    Persistent => "persistent",
});

impl StorageScope {
    /// Scope selected by the "remember me" flag.
    #[must_use]
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            Self::Persistent
        } else {
            Self::Session
        }
    }

    /// The scope that is not `self`.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Session => Self::Persistent,
            Self::Persistent => Self::Session,
        }
    }
}
