//! Credential storage and refresh coordination

pub mod refresh;
pub mod token_store;

pub use refresh::RefreshCoordinator;
pub use token_store::TokenStore;
