//! Authenticated request pipeline
//!
//! - [`interceptors`]: request / response / error hooks and the defaults
//! - [`pipeline`]: retry, 401 recovery and typed helpers

pub mod interceptors;
pub mod pipeline;

pub use interceptors::{
    BearerTokenInterceptor, ErrorInterceptor, LoggingErrorInterceptor, NotifyingErrorInterceptor,
    RequestInterceptor, ResponseInterceptor,
};
pub use pipeline::{RequestPipeline, RequestPipelineBuilder};
