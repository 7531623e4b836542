//! Domain types and models

pub mod credential;
pub mod notification;
pub mod storage;
pub mod user;
pub mod wire;

pub use credential::Credential;
pub use notification::{Notification, NotificationPosition, NotificationVariant};
pub use storage::StorageScope;
pub use user::UserProfile;
pub use wire::{
    LoginCredentials, LoginRequest, LoginResponse, LoginToken, RefreshRequest, RefreshResponse,
};
