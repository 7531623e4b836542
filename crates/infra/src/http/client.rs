use std::time::Duration;

use gatehouse_common::resilience::{RetryConfig, RetryDecision, RetryExecutor};
use gatehouse_domain::{ApiError, GatehouseError, HttpConfig};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use tracing::debug;
use url::Url;

use super::request::{ApiRequest, RequestBody};
use super::response::ApiResponse;
use super::upload;
use crate::errors::{from_response, from_transport};

/// HTTP client with built-in retry and timeout support.
///
/// Timeouts, network failures and 5xx responses are retried up to the
/// attempt ceiling with a fixed delay; any other failure is returned after
/// the first attempt.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    retry: RetryExecutor,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Build a client from the transport section of the configuration.
    pub fn from_config(config: &HttpConfig) -> Result<Self, GatehouseError> {
        Self::builder()
            .base_url(config.base_url.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .max_attempts(config.retry_attempts)
            .retry_delay(Duration::from_millis(config.retry_delay_ms))
            .user_agent(config.user_agent.clone())
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry.config()
    }

    /// Absolute URL for `path`; absolute URLs pass through untouched.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), path)
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), path)
        };
        Url::parse(&raw).map_err(|err| ApiError::local(format!("invalid URL {raw:?}: {err}")))
    }

    /// Execute `request` with retry semantics.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.resolve(&request.path)?;
        let outcome = self
            .retry
            .execute(|attempt| self.attempt(request, &url, attempt), &retry_transient)
            .await;

        if outcome.attempts > 1 {
            debug!(
                method = %request.method,
                %url,
                attempts = outcome.attempts,
                ok = outcome.result.is_ok(),
                "request finished after retries"
            );
        }
        outcome.into_result()
    }

    async fn attempt(
        &self,
        request: &ApiRequest,
        url: &Url,
        attempt: u32,
    ) -> Result<ApiResponse, ApiError> {
        let method = &request.method;
        debug!(attempt, %method, %url, "sending HTTP request");

        let response = self.build(request, url)?.send().await.map_err(|err| {
            debug!(attempt, %method, %url, error = %err, "HTTP request failed");
            from_transport(&err)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| from_transport(&err))?.to_vec();
        debug!(attempt, %method, %url, %status, "received HTTP response");

        if status.is_success() {
            Ok(ApiResponse { status: status.as_u16(), headers, body })
        } else {
            Err(from_response(status.as_u16(), &body))
        }
    }

    fn build(&self, request: &ApiRequest, url: &Url) -> Result<RequestBuilder, ApiError> {
        let mut builder = self.client.request(request.method.clone(), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(body) => builder.multipart(upload::build_form(body)?),
        };
        Ok(builder)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry.config())
            .finish()
    }
}

fn retry_transient(err: &ApiError, _attempt: u32) -> RetryDecision {
    if err.is_retryable() {
        RetryDecision::Retry
    } else {
        RetryDecision::Stop
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    max_attempts: u32,
    retry_delay: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            base_url: http.base_url,
            timeout: Duration::from_millis(http.timeout_ms),
            max_attempts: http.retry_attempts,
            retry_delay: Duration::from_millis(http.retry_delay_ms),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Fixed pause between attempts.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, GatehouseError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| GatehouseError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient {
            client,
            base_url: self.base_url,
            retry: RetryExecutor::new(RetryConfig::fixed(self.max_attempts, self.retry_delay)),
        })
    }
}
