//! Request pipeline with interceptors, retry and 401 recovery
//!
//! One logical call goes through:
//!
//! ```text
//! request interceptors -> transport (retry) -> response interceptors
//!        | 401 on a standard call
//!        v
//! refresh (single-flight) --ok--> replay once through the same chain
//!        |
//!        +--failed--> "session expired" notification, purge, redirect
//! ```
//!
//! Every error that leaves the pipeline has passed through the error
//! interceptors and is an [`ApiError`].

use std::sync::Arc;

use gatehouse_core::{
    Navigator, Notifier, RefreshCoordinator, SessionExpiryHandler, SilentNotifier, TokenStore,
};
use gatehouse_domain::{
    ApiError, AuthConfig, GatehouseError, RefreshRequest, RefreshResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use super::interceptors::{
    BearerTokenInterceptor, ErrorInterceptor, LoggingErrorInterceptor, NotifyingErrorInterceptor,
    RequestInterceptor, ResponseInterceptor,
};
use crate::errors::from_storage;
use crate::http::{ApiRequest, ApiResponse, AuthMode, HttpClient, ProgressFn, UploadRequest};

/// Resilient request executor
///
/// Cheap to clone; clones share interceptors, the token store and the
/// refresh lease.
#[derive(Clone)]
pub struct RequestPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    http: HttpClient,
    store: Arc<TokenStore>,
    coordinator: RefreshCoordinator,
    expiry: SessionExpiryHandler,
    auth: AuthConfig,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    error_interceptors: Vec<Arc<dyn ErrorInterceptor>>,
}

impl RequestPipeline {
    pub fn builder(http: HttpClient, store: Arc<TokenStore>) -> RequestPipelineBuilder {
        RequestPipelineBuilder::new(http, store)
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.inner.store
    }

    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.inner.auth
    }

    pub fn expiry(&self) -> &SessionExpiryHandler {
        &self.inner.expiry
    }

    /// Whether a refresh exchange is currently running
    pub fn refresh_in_flight(&self) -> bool {
        self.inner.coordinator.in_flight()
    }

    /// Run one logical call.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let sent_with = self.current_token();
        let err = match self.run_chain(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if err.is_unauthorized() && self.recovers(&request) {
            return self.recover(request, err, sent_with).await;
        }
        Err(self.intercept_error(&request, err).await)
    }

    /// Run `request` and deserialize the JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.execute(request).await?.json()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    /// Multipart upload through the same pipeline.
    ///
    /// `progress` receives `sent * 100 / total` as the transport consumes the
    /// file; the last report is always 100.
    pub async fn upload(
        &self,
        upload: UploadRequest,
        progress: Option<ProgressFn>,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(upload.into_request(progress)).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Joins an exchange that is already running. With no refresh token
    /// stored the exchange fails locally without touching the network.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        let pipeline = self.clone();
        self.inner
            .coordinator
            .acquire_refresh(move || async move { pipeline.exchange_refresh_token().await })
            .await
    }

    /// Refresh on behalf of a rejected request.
    ///
    /// When the exchange fails, the session-expired notification, purge and
    /// redirect run inside the exchange itself, so a herd of 401s waiting on
    /// one lease ends the session once.
    async fn refresh_or_expire(&self) -> Result<String, ApiError> {
        let pipeline = self.clone();
        self.inner
            .coordinator
            .acquire_refresh(move || async move {
                let outcome = pipeline.exchange_refresh_token().await;
                if let Err(err) = &outcome {
                    if let Err(storage_err) = pipeline.inner.expiry.handle_expired(err) {
                        error!(error = %storage_err, "failed to purge expired session");
                    }
                }
                outcome
            })
            .await
    }

    async fn exchange_refresh_token(&self) -> Result<RefreshResponse, ApiError> {
        let refresh_token = self
            .inner
            .store
            .get_refresh_token()
            .map_err(from_storage)?
            .ok_or_else(|| ApiError::local("no refresh token available"))?;

        let request = ApiRequest::post(self.inner.auth.refresh_path.clone())
            .json(&RefreshRequest { refresh_token })?
            .mode(AuthMode::Bypass);
        self.dispatch(request).await?.json()
    }

    async fn recover(
        &self,
        request: ApiRequest,
        cause: ApiError,
        sent_with: Option<String>,
    ) -> Result<ApiResponse, ApiError> {
        match (sent_with.as_deref(), self.current_token().as_deref()) {
            // A refresh already persisted a new token after this request was sent.
            (sent, Some(current)) if sent != Some(current) => {
                debug!("token changed since the request was sent; replaying");
                return self.dispatch(request).await;
            }
            // Another call already ended the session.
            (Some(_), None) => {
                debug!("session already ended while the request was in flight");
                return Err(self.intercept_error(&request, cause).await);
            }
            _ => {}
        }

        info!("access token rejected; refreshing");
        match self.refresh_or_expire().await {
            Ok(_) => {
                debug!("replaying request with refreshed token");
                self.dispatch(request).await
            }
            Err(refresh_err) => {
                debug!(error = %refresh_err, "refresh failed; surfacing the original rejection");
                Err(self.intercept_error(&request, cause).await)
            }
        }
    }

    /// One pass through the chain with no 401 recovery.
    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        match self.run_chain(request.clone()).await {
            Ok(response) => Ok(response),
            Err(err) => Err(self.intercept_error(&request, err).await),
        }
    }

    async fn run_chain(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        for interceptor in &self.inner.request_interceptors {
            request = interceptor.on_request(request).await?;
        }
        let mut response = self.inner.http.send(&request).await?;
        for interceptor in &self.inner.response_interceptors {
            response = interceptor.on_response(&request, response).await?;
        }
        Ok(response)
    }

    async fn intercept_error(&self, request: &ApiRequest, mut err: ApiError) -> ApiError {
        for interceptor in &self.inner.error_interceptors {
            err = interceptor.on_error(request, err).await;
        }
        err
    }

    /// Standard calls recover, except the refresh endpoint itself.
    fn recovers(&self, request: &ApiRequest) -> bool {
        request.mode == AuthMode::Standard && !self.is_refresh_endpoint(&request.path)
    }

    fn is_refresh_endpoint(&self, path: &str) -> bool {
        let http = &self.inner.http;
        match (http.resolve(path), http.resolve(&self.inner.auth.refresh_path)) {
            (Ok(target), Ok(refresh)) => {
                target.host() == refresh.host()
                    && target.port_or_known_default() == refresh.port_or_known_default()
                    && target.path().trim_end_matches('/') == refresh.path().trim_end_matches('/')
            }
            _ => false,
        }
    }

    fn current_token(&self) -> Option<String> {
        self.inner.store.get_token().ok().flatten()
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("http", &self.inner.http)
            .field("request_interceptors", &self.inner.request_interceptors.len())
            .field("response_interceptors", &self.inner.response_interceptors.len())
            .field("error_interceptors", &self.inner.error_interceptors.len())
            .finish()
    }
}

/// Builder for [`RequestPipeline`]
///
/// The bearer-token request interceptor and the logging error interceptor
/// are always installed first; the notifying error interceptor follows
/// unless disabled. Custom interceptors run after the defaults, in the order
/// they were added.
pub struct RequestPipelineBuilder {
    http: HttpClient,
    store: Arc<TokenStore>,
    auth: AuthConfig,
    notifier: Arc<dyn Notifier>,
    navigator: Option<Arc<dyn Navigator>>,
    notify_errors: bool,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    error_interceptors: Vec<Arc<dyn ErrorInterceptor>>,
}

impl RequestPipelineBuilder {
    fn new(http: HttpClient, store: Arc<TokenStore>) -> Self {
        Self {
            http,
            store,
            auth: AuthConfig::default(),
            notifier: Arc::new(SilentNotifier),
            navigator: None,
            notify_errors: true,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            error_interceptors: Vec::new(),
        }
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Toggle the built-in error-to-notification interceptor.
    pub fn notify_errors(mut self, enabled: bool) -> Self {
        self.notify_errors = enabled;
        self
    }

    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn error_interceptor(mut self, interceptor: Arc<dyn ErrorInterceptor>) -> Self {
        self.error_interceptors.push(interceptor);
        self
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns `GatehouseError::Config` if no navigator was set
    pub fn build(self) -> Result<RequestPipeline, GatehouseError> {
        let navigator = self
            .navigator
            .ok_or_else(|| GatehouseError::Config("Navigator not set".to_string()))?;

        let mut request_interceptors: Vec<Arc<dyn RequestInterceptor>> =
            vec![Arc::new(BearerTokenInterceptor::new(Arc::clone(&self.store)))];
        request_interceptors.extend(self.request_interceptors);

        let mut error_interceptors: Vec<Arc<dyn ErrorInterceptor>> =
            vec![Arc::new(LoggingErrorInterceptor)];
        if self.notify_errors {
            error_interceptors
                .push(Arc::new(NotifyingErrorInterceptor::new(Arc::clone(&self.notifier))));
        }
        error_interceptors.extend(self.error_interceptors);

        let expiry = SessionExpiryHandler::new(
            Arc::clone(&self.store),
            self.notifier,
            navigator,
            self.auth.sign_in_path.clone(),
        );

        Ok(RequestPipeline {
            inner: Arc::new(PipelineInner {
                http: self.http,
                coordinator: RefreshCoordinator::new(Arc::clone(&self.store)),
                store: self.store,
                expiry,
                auth: self.auth,
                request_interceptors,
                response_interceptors: self.response_interceptors,
                error_interceptors,
            }),
        })
    }
}
