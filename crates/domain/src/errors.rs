//! Error types used throughout the application
//!
//! Two families live here:
//! - [`GatehouseError`]: infrastructure failures (storage, config, I/O).
//! - [`ApiError`]: the single normalized shape every request outcome takes
//!   once it leaves the request pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{STATUS_NO_RESPONSE, STATUS_TIMEOUT};

/// Main error type for Gatehouse infrastructure
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GatehouseError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Gatehouse operations
pub type Result<T> = std::result::Result<T, GatehouseError>;

impl From<serde_json::Error> for GatehouseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Transport-level classification of a failed call
///
/// `Unauthorized` is split out of `Client` because it drives the refresh
/// recovery flow instead of being surfaced directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// No response was received (connection refused, DNS, reset)
    Network,
    /// The transport timeout elapsed
    Timeout,
    /// 4xx other than 401
    Client,
    /// 5xx
    Server,
    /// 401
    Unauthorized,
    /// Local failure: programmer error, storage, (de)serialization
    Local,
}

crate::impl_domain_status_conversions!(ApiErrorKind {
    Network => "network",
    Timeout => "timeout",
    Client => "client",
    Server => "server",
    Unauthorized => "unauthorized",
    Local => "local",
});

impl ApiErrorKind {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            500..=599 => Self::Server,
            _ => Self::Client,
        }
    }

    /// Whether the fixed-delay retry policy may repeat a call that failed
    /// with this kind. Client errors (401/403/404 included) never are.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Server)
    }
}

/// Normalized error shape `{ code, message, details? }`
///
/// `code` is the HTTP status when a response was received, `0` when none was
/// (network and local failures) and `408` for transport timeouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, code: u16, message: impl Into<String>) -> Self {
        Self { kind, code, message: message.into(), details: None }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, STATUS_NO_RESPONSE, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, STATUS_TIMEOUT, message)
    }

    pub fn local(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Local, STATUS_NO_RESPONSE, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, 401, message)
    }

    /// Build an error from a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::from_status(status), status, message)
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error ({}): {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<GatehouseError> for ApiError {
    fn from(err: GatehouseError) -> Self {
        Self::local(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_from_its_display_form() {
        assert_eq!("timeout".parse::<ApiErrorKind>(), Ok(ApiErrorKind::Timeout));
        assert_eq!("Unauthorized".parse::<ApiErrorKind>(), Ok(ApiErrorKind::Unauthorized));
        assert!("teapot".parse::<ApiErrorKind>().is_err());
    }

    #[test]
    fn status_classification() {
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Unauthorized);
        assert_eq!(ApiErrorKind::from_status(403), ApiErrorKind::Client);
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::Client);
        assert_eq!(ApiErrorKind::from_status(422), ApiErrorKind::Client);
        assert_eq!(ApiErrorKind::from_status(500), ApiErrorKind::Server);
        assert_eq!(ApiErrorKind::from_status(503), ApiErrorKind::Server);
    }

    #[test]
    fn only_transport_and_server_failures_are_retryable() {
        assert!(ApiError::network("down").is_retryable());
        assert!(ApiError::timeout("slow").is_retryable());
        assert!(ApiError::from_status(502, "bad gateway").is_retryable());
        assert!(!ApiError::from_status(400, "bad").is_retryable());
        assert!(!ApiError::from_status(401, "expired").is_retryable());
        assert!(!ApiError::from_status(403, "nope").is_retryable());
        assert!(!ApiError::local("bug").is_retryable());
    }

    #[test]
    fn normalized_shape_serializes_without_empty_details() {
        let err = ApiError::from_status(404, "missing");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], 404);
        assert_eq!(json["message"], "missing");
        assert_eq!(json["kind"], "client");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn infrastructure_errors_become_local() {
        let err: ApiError = GatehouseError::Storage("quota exceeded".into()).into();
        assert_eq!(err.kind, ApiErrorKind::Local);
        assert_eq!(err.code, 0);
        assert!(err.message.contains("quota exceeded"));
    }
}
