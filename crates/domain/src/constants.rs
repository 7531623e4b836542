//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Persisted storage keys (scope-qualified by the backend they live in)
pub const KEY_AUTH_TOKEN: &str = "auth_token";
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";
pub const KEY_REFRESH_TOKEN_EXPIRY: &str = "refresh_token_expiry";
pub const KEY_USER_DATA: &str = "user_data";
pub const KEY_REMEMBER_ME: &str = "remember_me";

/// Every key cleared by a full auth purge.
pub const AUTH_KEYS: [&str; 5] =
    [KEY_AUTH_TOKEN, KEY_REFRESH_TOKEN, KEY_REFRESH_TOKEN_EXPIRY, KEY_USER_DATA, KEY_REMEMBER_ME];

/// Keys written to the active scope; the inactive scope's copy is removed on
/// every write.
pub const SCOPED_KEYS: [&str; 4] =
    [KEY_AUTH_TOKEN, KEY_REFRESH_TOKEN, KEY_REFRESH_TOKEN_EXPIRY, KEY_USER_DATA];

// Token lifetimes
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Token returned when the skip-auth deployment override is enabled.
pub const SKIP_AUTH_SENTINEL_TOKEN: &str = "skip-auth-token";

// Request pipeline defaults
pub const DEFAULT_TIMEOUT_MS: u64 = 90_000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_USER_AGENT: &str = "gatehouse/0.1";

// Normalized status codes for failures without an HTTP response
pub const STATUS_NO_RESPONSE: u16 = 0;
pub const STATUS_TIMEOUT: u16 = 408;

// Default endpoints
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/auth/logout";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_PROFILE_PATH: &str = "/auth/me";
pub const DEFAULT_SIGN_IN_PATH: &str = "/login";

// Notification defaults
pub const NOTIFICATION_DURATION_MS: u64 = 4_500;
