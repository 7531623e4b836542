//! Session rules that sit above the token store
//!
//! - [`permissions`]: role and permission queries over a profile
//! - [`notifications`]: the error-to-notification table
//! - [`expiry`]: the "session expired" recovery path

pub mod expiry;
pub mod notifications;
pub mod permissions;

pub use expiry::SessionExpiryHandler;
pub use notifications::{notification_for, ErrorContext, ErrorReport};
pub use permissions::PermissionQuery;
