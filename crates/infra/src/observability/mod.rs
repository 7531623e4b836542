//! Tracing subscriber installation
//!
//! The filter comes from `GATEHOUSE_LOG` when set, otherwise from the
//! configured level. Output is human-readable unless JSON is requested.

use gatehouse_domain::{GatehouseError, LoggingConfig};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the configured filter
pub const LOG_ENV_VAR: &str = "GATEHOUSE_LOG";

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (by an earlier
/// call or by the host application).
///
/// # Errors
///
/// Returns `GatehouseError::Config` when the filter directive is invalid
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, GatehouseError> {
    let filter = build_filter(config)?;

    let installed = if config.json {
        tracing_subscriber::registry().with(filter).with(fmt::layer().json()).try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, GatehouseError> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| GatehouseError::Config(format!("Invalid {LOG_ENV_VAR}: {e}"))),
        _ => EnvFilter::try_new(&config.level)
            .map_err(|e| GatehouseError::Config(format!("Invalid log level: {e}"))),
    }
}
