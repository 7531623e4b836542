//! Configuration loading and management
//!
//! This module provides utilities for loading the request-layer
//! configuration from environment variables and files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, load_or_default, probe_config_paths};
