//! Wire shapes of the auth endpoints

use serde::{Deserialize, Serialize};

use crate::UserProfile;

/// What the sign-in form collects
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>, remember_me: bool) -> Self {
        Self { email: email.into(), password: password.into(), remember_me }
    }

    /// Body sent to the login endpoint; the remember-me flag stays local.
    #[must_use]
    pub fn to_request(&self) -> LoginRequest {
        LoginRequest { email: self.email.clone(), password: self.password.clone() }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// `{ email, password }`
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `{ profile, token: { accessToken, refreshToken, expiresIn } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub profile: UserProfile,
    pub token: LoginToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// `{ refresh_token }`
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// `{ accessToken, refreshToken?, tokenType, expiresIn }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}
