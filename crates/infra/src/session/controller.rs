//! Login, logout and the current-user lifecycle
//!
//! The controller is what the console calls. It owns the ordering rules of
//! sign-in (scope first, then credentials, then purge of the other scope),
//! makes logout always end unauthenticated, and deduplicates concurrent
//! profile fetches behind a single-flight lease.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gatehouse_common::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use gatehouse_common::{SingleFlight, StorageResult};
use gatehouse_core::{Navigator, Notifier, PermissionQuery, TokenStore};
use gatehouse_domain::{
    ApiError, GatehouseConfig, GatehouseError, LoginCredentials, LoginResponse, UserProfile,
};
use tracing::{error, info, instrument, warn};

use crate::api::RequestPipeline;
use crate::errors::from_storage;
use crate::http::{ApiRequest, AuthMode, HttpClient};

/// Session orchestration over the request pipeline
#[derive(Debug)]
pub struct SessionController {
    pipeline: RequestPipeline,
    profile_fetch: SingleFlight<UserProfile, ApiError>,
}

impl SessionController {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline, profile_fetch: SingleFlight::new("current-user") }
    }

    /// Wire the whole stack from configuration.
    ///
    /// The session scope lives in memory; the persistent scope is a JSON file
    /// when `storage.persistent_path` is set, memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the persistent store
    /// cannot be opened or the HTTP client cannot be built
    pub fn from_config(
        config: &GatehouseConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, GatehouseError> {
        config.validate()?;

        let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new("session"));
        let persistent: Arc<dyn KeyValueStore> = match config.storage.persistent_path.as_deref() {
            Some(path) => Arc::new(JsonFileStore::open("persistent", path)?),
            None => Arc::new(MemoryStore::new("persistent")),
        };
        let store = TokenStore::new(session, persistent)
            .with_refresh_ttl(Duration::days(config.auth.refresh_token_ttl_days))
            .with_skip_auth(config.auth.skip_auth);

        let http = HttpClient::from_config(&config.http)?;
        let pipeline = RequestPipeline::builder(http, Arc::new(store))
            .auth(config.auth.clone())
            .notifier(notifier)
            .navigator(navigator)
            .build()?;
        Ok(Self::new(pipeline))
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        self.pipeline.store()
    }

    /// Sign in and establish the session.
    ///
    /// Bypasses 401 recovery: a rejected sign-in is reported as invalid
    /// credentials and never redirects.
    #[instrument(skip(self, credentials), fields(remember_me = credentials.remember_me))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserProfile, ApiError> {
        let request = ApiRequest::post(self.pipeline.auth_config().login_path.clone())
            .json(&credentials.to_request())?
            .mode(AuthMode::Login);
        let response: LoginResponse = self.pipeline.send_json(request).await?;

        self.establish(credentials.remember_me, &response).map_err(from_storage)?;
        info!(user_id = %response.profile.id, "signed in");
        Ok(response.profile)
    }

    fn establish(&self, remember_me: bool, response: &LoginResponse) -> StorageResult<()> {
        let store = self.store();
        store.clear_auth()?;
        // Scope selection must precede every credential write.
        store.set_remember_me(remember_me)?;
        store.set_token(&response.token.access_token)?;
        if let Some(refresh_token) = response.token.refresh_token.as_deref() {
            store.set_refresh_token(refresh_token)?;
        }
        store.set_user(&response.profile)?;
        store.purge_inactive_scope()?;
        store.record_access_expiry(response.token.expires_in);
        Ok(())
    }

    /// Sign out. Local state is always cleared; a failing server call is
    /// logged and swallowed.
    ///
    /// # Errors
    ///
    /// Only a storage failure while clearing is returned
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        match self.store().get_token() {
            Ok(Some(token)) => {
                let request = ApiRequest::post(self.pipeline.auth_config().logout_path.clone())
                    .header("Authorization", format!("Bearer {token}"))
                    .mode(AuthMode::Bypass);
                if let Err(err) = self.pipeline.execute(request).await {
                    warn!(error = %err, "logout request failed; clearing local session anyway");
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "could not read token for logout request"),
        }

        self.store().clear_auth().map_err(from_storage)?;
        self.pipeline.expiry().redirect_to_sign_in();
        info!("signed out");
        Ok(())
    }

    /// Fetch the signed-in user's profile.
    ///
    /// Concurrent callers share one request and one outcome. A failure only
    /// ends the session when it is classified unauthorized.
    pub async fn get_current_user(&self) -> Result<UserProfile, ApiError> {
        let pipeline = self.pipeline.clone();
        self.profile_fetch.run(move || fetch_profile(pipeline)).await
    }

    /// Exchange the stored refresh token now.
    ///
    /// # Errors
    ///
    /// Fails immediately, without a network call, when no refresh token is
    /// stored
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        if self.store().get_refresh_token().map_err(from_storage)?.is_none() {
            return Err(ApiError::local("no refresh token available"));
        }
        self.pipeline.refresh().await
    }

    pub fn is_authenticated(&self) -> Result<bool, ApiError> {
        self.store().is_authenticated().map_err(from_storage)
    }

    /// Cached profile, no network
    pub fn user(&self) -> Result<Option<UserProfile>, ApiError> {
        self.store().get_user().map_err(from_storage)
    }

    pub fn access_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.store().access_token_expires_at()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.cached_profile().has_permission(permission)
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        self.cached_profile().has_any_permission(permissions)
    }

    pub fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        self.cached_profile().has_all_permissions(permissions)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.cached_profile().has_role(role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.cached_profile().has_any_role(roles)
    }

    pub fn has_all_roles(&self, roles: &[&str]) -> bool {
        self.cached_profile().has_all_roles(roles)
    }

    fn cached_profile(&self) -> Option<UserProfile> {
        self.store().get_user().unwrap_or_else(|err| {
            error!(error = %err, "cached profile unreadable; denying");
            None
        })
    }
}

async fn fetch_profile(pipeline: RequestPipeline) -> Result<UserProfile, ApiError> {
    let path = pipeline.auth_config().profile_path.clone();
    match pipeline.send_json::<UserProfile>(ApiRequest::get(path)).await {
        Ok(profile) => {
            pipeline.store().set_user(&profile).map_err(from_storage)?;
            Ok(profile)
        }
        Err(err) if err.is_unauthorized() => {
            warn!(error = %err, "profile fetch unauthorized; ending session");
            if let Err(clear_err) = pipeline.store().clear_auth() {
                error!(error = %clear_err, "failed to clear credentials");
            }
            Err(err)
        }
        Err(err) => Err(err),
    }
}
