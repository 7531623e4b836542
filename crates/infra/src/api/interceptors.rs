//! Request, response and error interceptors
//!
//! Interceptors run in registration order. Request interceptors run once per
//! pass through the pipeline (the replay after a refresh is a new pass, so it
//! picks up the new token); error interceptors see every terminal error.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_core::{notification_for, ErrorContext, Notifier, TokenStore};
use gatehouse_domain::{ApiError, ApiErrorKind};
use tracing::{error, warn};

use crate::errors::from_storage;
use crate::http::{ApiRequest, ApiResponse, AuthMode};

/// Rewrites a request before it is sent
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn on_request(&self, request: ApiRequest) -> Result<ApiRequest, ApiError>;
}

/// Inspects or rewrites a successful response
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_response(
        &self,
        request: &ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, ApiError>;
}

/// Observes or rewrites a terminal error
#[async_trait]
pub trait ErrorInterceptor: Send + Sync {
    async fn on_error(&self, request: &ApiRequest, error: ApiError) -> ApiError;
}

/// Attaches `Authorization: Bearer <token>` to standard calls
pub struct BearerTokenInterceptor {
    store: Arc<TokenStore>,
}

impl BearerTokenInterceptor {
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestInterceptor for BearerTokenInterceptor {
    async fn on_request(&self, mut request: ApiRequest) -> Result<ApiRequest, ApiError> {
        if request.mode != AuthMode::Standard {
            return Ok(request);
        }
        if let Some(token) = self.store.get_token().map_err(from_storage)? {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        Ok(request)
    }
}

/// Logs every terminal error
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorInterceptor;

#[async_trait]
impl ErrorInterceptor for LoggingErrorInterceptor {
    async fn on_error(&self, request: &ApiRequest, err: ApiError) -> ApiError {
        let method = &request.method;
        let path = request.path.as_str();
        match err.kind {
            ApiErrorKind::Client | ApiErrorKind::Unauthorized => {
                warn!(%method, path, code = err.code, kind = %err.kind, message = %err.message, "request rejected");
            }
            ApiErrorKind::Network
            | ApiErrorKind::Timeout
            | ApiErrorKind::Server
            | ApiErrorKind::Local => {
                error!(%method, path, code = err.code, kind = %err.kind, message = %err.message, "request failed");
            }
        }
        err
    }
}

/// Turns terminal errors into user-facing notifications
///
/// Internal calls stay silent. A standard-call 401 is left to the session
/// expiry path, which shows its own notification.
pub struct NotifyingErrorInterceptor {
    notifier: Arc<dyn Notifier>,
}

impl NotifyingErrorInterceptor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ErrorInterceptor for NotifyingErrorInterceptor {
    async fn on_error(&self, request: &ApiRequest, err: ApiError) -> ApiError {
        let context = match request.mode {
            AuthMode::Bypass => return err,
            AuthMode::Login => ErrorContext::Login,
            AuthMode::Standard if err.is_unauthorized() => return err,
            AuthMode::Standard => ErrorContext::Session,
        };
        if let Some(report) = notification_for(&err, context) {
            self.notifier.notify(report.notification);
        }
        err
    }
}
