//! "Session expired" recovery
//!
//! Notify, purge local credentials, then send the user to the sign-in entry
//! point unless they are already there.

use std::sync::Arc;

use gatehouse_common::StorageResult;
use gatehouse_domain::{ApiError, Notification};
use tracing::{debug, info};

use super::notifications::{notification_for, ErrorContext};
use crate::auth::TokenStore;
use crate::ports::{Navigator, Notifier};

/// Drives the user-visible side of a failed refresh
#[derive(Clone)]
pub struct SessionExpiryHandler {
    store: Arc<TokenStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    sign_in_path: String,
}

impl SessionExpiryHandler {
    pub fn new(
        store: Arc<TokenStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        sign_in_path: impl Into<String>,
    ) -> Self {
        Self { store, notifier, navigator, sign_in_path: sign_in_path.into() }
    }

    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Notify, purge and redirect. Returns whether a redirect was issued.
    pub fn handle_expired(&self, cause: &ApiError) -> StorageResult<bool> {
        info!(error = %cause, "session expired");
        let notification = notification_for(cause, ErrorContext::Session)
            .filter(|report| report.redirect_to_sign_in)
            .map(|report| report.notification)
            .unwrap_or_else(|| {
                Notification::warning(
                    "Session expired",
                    "Your session has expired. Please sign in again.",
                )
            });
        self.notifier.notify(notification);
        self.store.clear_auth()?;
        Ok(self.redirect_to_sign_in())
    }

    /// Navigate to the sign-in entry point unless already on it.
    pub fn redirect_to_sign_in(&self) -> bool {
        let current = self.navigator.current_path();
        if self.is_sign_in_path(&current) {
            debug!(path = %current, "already at sign-in; redirect skipped");
            return false;
        }
        self.navigator.redirect(&self.sign_in_path);
        true
    }

    fn is_sign_in_path(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        path.trim_end_matches('/') == self.sign_in_path.trim_end_matches('/')
    }
}

impl std::fmt::Debug for SessionExpiryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionExpiryHandler").field("sign_in_path", &self.sign_in_path).finish()
    }
}
