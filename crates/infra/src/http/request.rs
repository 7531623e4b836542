//! Rebuildable request description
//!
//! An [`ApiRequest`] is plain data. Interceptors rewrite it, and the
//! transport rebuilds a fresh `reqwest` request from it for every attempt,
//! which is what lets the same logical call be retried and replayed after a
//! token refresh.

use std::sync::Arc;

use gatehouse_domain::ApiError;
use reqwest::Method;
use serde::Serialize;

/// Upload progress callback, called with a percentage in `0..=100`
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// How the pipeline treats credentials for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Bearer token attached; a 401 triggers refresh recovery
    #[default]
    Standard,
    /// The sign-in call: no prior session, no recovery, no redirect
    Login,
    /// Internal calls such as the refresh exchange: no recovery, no toast
    Bypass,
}

/// Request body
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// One file part plus text fields
#[derive(Clone)]
pub struct MultipartBody {
    pub field_name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Arc<[u8]>,
    pub fields: Vec<(String, String)>,
    pub progress: Option<ProgressFn>,
}

impl std::fmt::Debug for MultipartBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartBody")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .field("fields", &self.fields)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Caller-facing description of an upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: String,
    pub field_name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Arc<[u8]>,
    pub fields: Vec<(String, String)>,
}

impl UploadRequest {
    pub fn new(
        path: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            path: path.into(),
            field_name: "file".to_string(),
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    #[must_use]
    pub fn content_type(mut self, mime: impl Into<String>) -> Self {
        self.content_type = Some(mime.into());
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Turn the upload into a POST carrying a multipart body.
    pub fn into_request(self, progress: Option<ProgressFn>) -> ApiRequest {
        let body = MultipartBody {
            field_name: self.field_name,
            file_name: self.file_name,
            content_type: self.content_type,
            bytes: self.bytes,
            fields: self.fields,
            progress,
        };
        ApiRequest::post(self.path).body(RequestBody::Multipart(body))
    }
}

/// One logical call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub mode: AuthMode,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            mode: AuthMode::Standard,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::local(format!("failed to serialize request body: {err}")))?;
        Ok(self.body(RequestBody::Json(value)))
    }

    #[must_use]
    pub fn mode(mut self, mode: AuthMode) -> Self {
        self.mode = mode;
        self
    }

    /// Header value, matched case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Insert or replace a header, matched case-insensitively
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }
}
