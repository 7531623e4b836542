//! Configuration loader
//!
//! Loads the console's request-layer configuration from environment
//! variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `GATEHOUSE_BASE_URL` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GATEHOUSE_BASE_URL`: API base URL (required for env loading)
//! - `GATEHOUSE_TIMEOUT_MS`: Transport timeout in milliseconds
//! - `GATEHOUSE_RETRY_ATTEMPTS`: Total attempts per call
//! - `GATEHOUSE_RETRY_DELAY_MS`: Fixed delay between attempts
//! - `GATEHOUSE_PERSISTENT_STORE`: JSON file backing the persistent scope
//! - `GATEHOUSE_SKIP_AUTH`: Deployment skip-auth override (true/false)
//! - `GATEHOUSE_LOG_LEVEL`: Default log filter
//!
//! Unset optional variables keep their defaults.
//!
//! ## File Locations
//! The loader probes `gatehouse.toml` / `gatehouse.json` in the current
//! working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use gatehouse_domain::{GatehouseConfig, GatehouseError, Result};

const CONFIG_FILE_NAMES: [&str; 2] = ["gatehouse.toml", "gatehouse.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `GatehouseError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded values fail validation
pub fn load() -> Result<GatehouseConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Like [`load`], but falls back to defaults when no source is present.
///
/// # Errors
/// Returns `GatehouseError::Config` if a source exists but is invalid.
pub fn load_or_default() -> Result<GatehouseConfig> {
    if std::env::var_os("GATEHOUSE_BASE_URL").is_none() && probe_config_paths().is_none() {
        tracing::info!("No configuration source found; using defaults");
        return Ok(GatehouseConfig::default());
    }
    load()
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `GatehouseError::Config` if `GATEHOUSE_BASE_URL` is missing or a
/// numeric variable has an invalid value.
pub fn load_from_env() -> Result<GatehouseConfig> {
    let mut config = GatehouseConfig::default();

    config.http.base_url = env_var("GATEHOUSE_BASE_URL")?;
    if let Some(timeout) = env_parse::<u64>("GATEHOUSE_TIMEOUT_MS", "timeout")? {
        config.http.timeout_ms = timeout;
    }
    if let Some(attempts) = env_parse::<u32>("GATEHOUSE_RETRY_ATTEMPTS", "retry attempts")? {
        config.http.retry_attempts = attempts;
    }
    if let Some(delay) = env_parse::<u64>("GATEHOUSE_RETRY_DELAY_MS", "retry delay")? {
        config.http.retry_delay_ms = delay;
    }

    config.storage.persistent_path = std::env::var("GATEHOUSE_PERSISTENT_STORE").ok();
    config.auth.skip_auth = env_bool("GATEHOUSE_SKIP_AUTH", false);
    if let Ok(level) = std::env::var("GATEHOUSE_LOG_LEVEL") {
        config.logging.level = level;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `GatehouseError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<GatehouseConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GatehouseError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GatehouseError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GatehouseError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, format chosen by file extension
fn parse_config(contents: &str, path: &Path) -> Result<GatehouseConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GatehouseError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GatehouseError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(GatehouseError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(".."));
        dirs.insert(0, cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        GatehouseError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional numeric variable; unset means `None`.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GatehouseError::Config(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
