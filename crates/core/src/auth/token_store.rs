//! Credential persistence across the session and persistent scopes
//!
//! The store owns two key-value backends. The "remember me" flag, itself kept
//! in the persistent scope so it survives restarts, decides which of them is
//! active. Every write goes to the active scope and removes the same key from
//! the inactive one, so stale credentials never linger across scopes.
//!
//! Reads check the refresh-token expiry first: once it has passed, every auth
//! key is purged before anything is returned.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use gatehouse_common::storage::{KeyValueStore, StorageResult};
use gatehouse_common::time::{Clock, SystemClock};
use gatehouse_domain::constants::{
    AUTH_KEYS, KEY_AUTH_TOKEN, KEY_REFRESH_TOKEN, KEY_REFRESH_TOKEN_EXPIRY, KEY_REMEMBER_ME,
    KEY_USER_DATA, REFRESH_TOKEN_TTL_DAYS, SCOPED_KEYS, SKIP_AUTH_SENTINEL_TOKEN,
};
use gatehouse_domain::{Credential, StorageScope, UserProfile};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Two-scope credential store
pub struct TokenStore {
    session: Arc<dyn KeyValueStore>,
    persistent: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    refresh_ttl: Duration,
    skip_auth: bool,
    access_expires_at: Mutex<Option<DateTime<Utc>>>,
}

impl TokenStore {
    pub fn new(session: Arc<dyn KeyValueStore>, persistent: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session,
            persistent,
            clock: Arc::new(SystemClock),
            refresh_ttl: Duration::days(REFRESH_TOKEN_TTL_DAYS),
            skip_auth: false,
            access_expires_at: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lifetime stamped onto every stored refresh token
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// Deployment override: report authenticated and hand out a sentinel token.
    pub fn with_skip_auth(mut self, skip_auth: bool) -> Self {
        if skip_auth {
            warn!("skip-auth override enabled; requests carry a sentinel token");
        }
        self.skip_auth = skip_auth;
        self
    }

    /// Raw backend for `scope`, bypassing scope selection.
    pub fn backend(&self, scope: StorageScope) -> &dyn KeyValueStore {
        match scope {
            StorageScope::Session => self.session.as_ref(),
            StorageScope::Persistent => self.persistent.as_ref(),
        }
    }

    /// Select the active scope; call before writing any credential.
    pub fn set_remember_me(&self, remember_me: bool) -> StorageResult<()> {
        self.persistent.set(KEY_REMEMBER_ME, if remember_me { "true" } else { "false" })?;
        self.session.remove(KEY_REMEMBER_ME)?;
        debug!(scope = %StorageScope::from_remember_me(remember_me), "storage scope selected");
        Ok(())
    }

    pub fn remember_me(&self) -> StorageResult<bool> {
        Ok(self.persistent.get(KEY_REMEMBER_ME)?.as_deref() == Some("true"))
    }

    pub fn active_scope(&self) -> StorageResult<StorageScope> {
        Ok(StorageScope::from_remember_me(self.remember_me()?))
    }

    /// Access token, session scope first so a fresh non-remembered login
    /// shadows a stale persisted one.
    pub fn get_token(&self) -> StorageResult<Option<String>> {
        if self.skip_auth {
            return Ok(Some(SKIP_AUTH_SENTINEL_TOKEN.to_string()));
        }
        self.purge_if_refresh_expired()?;
        self.read_shadowed(KEY_AUTH_TOKEN)
    }

    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        self.write_scoped(KEY_AUTH_TOKEN, token)
    }

    /// Refresh token; `None` unless the persistent scope is active.
    pub fn get_refresh_token(&self) -> StorageResult<Option<String>> {
        if self.purge_if_refresh_expired()? {
            return Ok(None);
        }
        if self.active_scope()? != StorageScope::Persistent {
            return Ok(None);
        }
        self.persistent.get(KEY_REFRESH_TOKEN)
    }

    /// Store a refresh token with a `now + ttl` expiry. No-op in session scope.
    pub fn set_refresh_token(&self, token: &str) -> StorageResult<()> {
        if self.active_scope()? != StorageScope::Persistent {
            debug!("session scope active; refresh token discarded");
            return Ok(());
        }
        let expires_at = self.clock.now() + self.refresh_ttl;
        self.write_scoped(KEY_REFRESH_TOKEN, token)?;
        self.write_scoped(KEY_REFRESH_TOKEN_EXPIRY, &expires_at.timestamp_millis().to_string())
    }

    pub fn refresh_token_expiry(&self) -> StorageResult<Option<DateTime<Utc>>> {
        Ok(self.persistent.get(KEY_REFRESH_TOKEN_EXPIRY)?.as_deref().and_then(parse_expiry))
    }

    /// Cached profile. An unreadable cache entry reads as absent.
    pub fn get_user(&self) -> StorageResult<Option<UserProfile>> {
        self.purge_if_refresh_expired()?;
        let Some(raw) = self.read_shadowed(KEY_USER_DATA)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                warn!(error = %err, "cached user profile is unreadable; ignoring it");
                Ok(None)
            }
        }
    }

    pub fn set_user(&self, profile: &UserProfile) -> StorageResult<()> {
        let raw = serde_json::to_string(profile)?;
        self.write_scoped(KEY_USER_DATA, &raw)
    }

    /// Current credential, or `None` when no access token is stored.
    ///
    /// Token, refresh token and expiry are all read from the active scope.
    pub fn credential(&self) -> StorageResult<Option<Credential>> {
        self.purge_if_refresh_expired()?;
        let scope = self.active_scope()?;
        let backend = self.backend(scope);
        let Some(access_token) = backend.get(KEY_AUTH_TOKEN)? else {
            return Ok(None);
        };
        let mut credential = Credential::new(access_token);
        if scope == StorageScope::Persistent {
            let refresh = backend.get(KEY_REFRESH_TOKEN)?;
            let expiry = backend.get(KEY_REFRESH_TOKEN_EXPIRY)?.as_deref().and_then(parse_expiry);
            if let (Some(refresh), Some(expiry)) = (refresh, expiry) {
                credential = credential.with_refresh(refresh, expiry);
            }
        }
        Ok(Some(credential))
    }

    /// Remember the access-token lifetime reported by the server.
    ///
    /// Informational only; never persisted.
    pub fn record_access_expiry(&self, expires_in_secs: Option<i64>) {
        *self.access_expires_at.lock() =
            expires_in_secs.map(|secs| self.clock.now() + Duration::seconds(secs));
    }

    pub fn access_token_expires_at(&self) -> Option<DateTime<Utc>> {
        *self.access_expires_at.lock()
    }

    /// Remove every auth key from both scopes. Safe to repeat.
    pub fn clear_auth(&self) -> StorageResult<()> {
        for key in AUTH_KEYS {
            self.session.remove(key)?;
            self.persistent.remove(key)?;
        }
        *self.access_expires_at.lock() = None;
        debug!("auth state cleared");
        Ok(())
    }

    /// Remove leftover credential keys from the inactive scope.
    pub fn purge_inactive_scope(&self) -> StorageResult<()> {
        let inactive = self.backend(self.active_scope()?.other());
        for key in SCOPED_KEYS {
            inactive.remove(key)?;
        }
        Ok(())
    }

    /// Token and cached profile both present.
    pub fn is_authenticated(&self) -> StorageResult<bool> {
        if self.skip_auth {
            return Ok(true);
        }
        Ok(self.get_token()?.is_some() && self.get_user()?.is_some())
    }

    fn read_shadowed(&self, key: &str) -> StorageResult<Option<String>> {
        match self.session.get(key)? {
            Some(value) => Ok(Some(value)),
            None => self.persistent.get(key),
        }
    }

    fn write_scoped(&self, key: &str, value: &str) -> StorageResult<()> {
        let scope = self.active_scope()?;
        self.backend(scope).set(key, value)?;
        self.backend(scope.other()).remove(key)
    }

    /// Purge everything when the stored refresh expiry has passed.
    ///
    /// Returns `true` when a purge happened. An unparseable expiry counts as
    /// expired.
    fn purge_if_refresh_expired(&self) -> StorageResult<bool> {
        let Some(raw) = self.persistent.get(KEY_REFRESH_TOKEN_EXPIRY)? else {
            return Ok(false);
        };
        let expired = match parse_expiry(&raw) {
            Some(expires_at) => expires_at <= self.clock.now(),
            None => true,
        };
        if expired {
            info!("refresh token expired; purging stored credentials");
            self.clear_auth()?;
        }
        Ok(expired)
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim().parse::<i64>().ok().and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("session", &self.session.name())
            .field("persistent", &self.persistent.name())
            .field("refresh_ttl_days", &self.refresh_ttl.num_days())
            .field("skip_auth", &self.skip_auth)
            .finish()
    }
}
