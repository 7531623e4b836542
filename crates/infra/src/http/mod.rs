//! HTTP transport: request description, retrying client, multipart uploads

pub mod client;
pub mod request;
pub mod response;
pub mod upload;

pub use client::{HttpClient, HttpClientBuilder};
pub use request::{ApiRequest, AuthMode, MultipartBody, ProgressFn, RequestBody, UploadRequest};
pub use response::ApiResponse;
