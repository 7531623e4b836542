//! # Gatehouse Domain
//!
//! Domain types for the console's authenticated-request layer.
//!
//! This crate contains:
//! - Credential, profile and storage-scope types
//! - Wire shapes of the login / refresh endpoints
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Gatehouse crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
