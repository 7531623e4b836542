//! # Gatehouse Core
//!
//! Session rules with no transport code.
//!
//! This crate contains:
//! - The two-scope token store and its lifecycle rules
//! - The single-flight refresh coordinator
//! - Port interfaces for the notification sink and the navigator
//! - The error-to-notification table and session-expiry recovery
//! - Permission and role queries over the cached profile
//!
//! ## Architecture Principles
//! - Only depends on `gatehouse-common` and `gatehouse-domain`
//! - No HTTP code; the refresh exchange is injected as a closure
//! - All external side effects go through traits

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod ports;
pub mod session;

// Testing utilities
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::{RefreshCoordinator, TokenStore};
pub use ports::{Navigator, Notifier, SilentNotifier};
pub use session::{
    notification_for, ErrorContext, ErrorReport, PermissionQuery, SessionExpiryHandler,
};
