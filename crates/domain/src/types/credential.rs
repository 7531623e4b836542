//! Credential held for the authenticated session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access token plus the optional long-lived refresh token
///
/// `refresh_token` is only present in "remember me" mode. `expires_at` is the
/// refresh token's expiry when one is stored, otherwise `None`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: None, expires_at: None }
    }

    #[must_use]
    pub fn with_refresh(mut self, token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        self.refresh_token = Some(token.into());
        self.expires_at = Some(expires_at);
        self
    }

    /// `true` once the refresh expiry (if any) is at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &format_args!("<{} chars>", self.access_token.len()))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
