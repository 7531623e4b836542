//! Single-flight refresh-token exchange
//!
//! At most one exchange runs at a time. Callers that hit a 401 while an
//! exchange is running wait on that exchange instead of starting their own,
//! and all of them observe the same outcome.

use std::future::Future;
use std::sync::Arc;

use gatehouse_common::SingleFlight;
use gatehouse_domain::{ApiError, GatehouseError, RefreshResponse};
use tracing::{error, info, warn};

use super::token_store::TokenStore;

/// Coordinates refresh exchanges against one token store
#[derive(Debug)]
pub struct RefreshCoordinator {
    store: Arc<TokenStore>,
    flight: SingleFlight<String, ApiError>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store, flight: SingleFlight::new("refresh") }
    }

    /// Whether an exchange is currently running
    pub fn in_flight(&self) -> bool {
        self.flight.in_flight()
    }

    /// Join the running exchange or start one with `exchange`.
    ///
    /// On success the new tokens are in the store before any waiter resumes,
    /// and the new access token is returned. On failure the store is cleared
    /// and every waiter receives the same error.
    pub async fn acquire_refresh<F, Fut>(&self, exchange: F) -> Result<String, ApiError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<RefreshResponse, ApiError>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        self.flight.run(move || run_exchange(store, exchange)).await
    }

    /// Start an exchange without waiting for it.
    ///
    /// Ignored (with a warning) when called outside a Tokio runtime.
    pub fn trigger_refresh<F, Fut>(&self, exchange: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<RefreshResponse, ApiError>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        self.flight.trigger(move || run_exchange(store, exchange));
    }
}

async fn run_exchange<F, Fut>(store: Arc<TokenStore>, exchange: F) -> Result<String, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<RefreshResponse, ApiError>>,
{
    let outcome = match exchange().await {
        Ok(response) => persist(&store, response),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(token) => {
            info!("access token refreshed");
            Ok(token)
        }
        Err(err) => {
            warn!(error = %err, "refresh exchange failed; clearing credentials");
            if let Err(clear_err) = store.clear_auth() {
                error!(error = %clear_err, "failed to clear credentials after refresh failure");
            }
            Err(err)
        }
    }
}

fn persist(store: &TokenStore, response: RefreshResponse) -> Result<String, ApiError> {
    let write = || -> Result<(), GatehouseError> {
        store.set_token(&response.access_token)?;
        if let Some(refresh_token) = response.refresh_token.as_deref() {
            store.set_refresh_token(refresh_token)?;
        }
        Ok(())
    };
    write().map_err(ApiError::from)?;
    store.record_access_expiry(Some(response.expires_in));
    Ok(response.access_token)
}
