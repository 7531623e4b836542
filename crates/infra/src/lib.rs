//! # Gatehouse Infrastructure
//!
//! Transport and wiring for the authenticated-request layer.
//!
//! This crate contains:
//! - The retrying HTTP client and multipart uploads
//! - The request pipeline (interceptors, 401 recovery)
//! - The session controller (login, logout, current user)
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements the flows whose rules live in `gatehouse-core`
//! - Contains all "impure" code (network, files, environment)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod session;

// Re-export commonly used items
pub use api::{RequestPipeline, RequestPipelineBuilder};
pub use http::{ApiRequest, ApiResponse, AuthMode, HttpClient, ProgressFn, UploadRequest};
pub use observability::init_tracing;
pub use session::SessionController;
