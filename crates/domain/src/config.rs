//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, DEFAULT_PROFILE_PATH, DEFAULT_REFRESH_PATH,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_SIGN_IN_PATH, DEFAULT_TIMEOUT_MS,
    DEFAULT_USER_AGENT, REFRESH_TOKEN_TTL_DAYS,
};
use crate::{GatehouseError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatehouseConfig {
    pub http: HttpConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Total attempts (initial try + retries)
    pub retry_attempts: u32,
    /// Fixed delay between attempts; no backoff growth
    pub retry_delay_ms: u64,
    pub user_agent: String,
}

/// Auth endpoints and session rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub login_path: String,
    pub logout_path: String,
    pub refresh_path: String,
    pub profile_path: String,
    /// Sign-in entry point of the console
    pub sign_in_path: String,
    pub refresh_token_ttl_days: i64,
    /// Deployment override forcing the authenticated state
    pub skip_auth: bool,
}

/// Persistent scope location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the persistent scope; `None` keeps it in memory
    pub persistent_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            profile_path: DEFAULT_PROFILE_PATH.to_string(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            refresh_token_ttl_days: REFRESH_TOKEN_TTL_DAYS,
            skip_auth: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl GatehouseConfig {
    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns `GatehouseError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.http.base_url.trim().is_empty() {
            return Err(GatehouseError::Config("http.base_url must not be empty".into()));
        }
        if self.http.timeout_ms == 0 {
            return Err(GatehouseError::Config("http.timeout_ms must be positive".into()));
        }
        if self.http.retry_attempts == 0 {
            return Err(GatehouseError::Config("http.retry_attempts must be at least 1".into()));
        }
        if self.auth.refresh_token_ttl_days <= 0 {
            return Err(GatehouseError::Config(
                "auth.refresh_token_ttl_days must be positive".into(),
            ));
        }
        Ok(())
    }
}
