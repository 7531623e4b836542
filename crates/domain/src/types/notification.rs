//! Notifications handed to the external toast sink

use serde::{Deserialize, Serialize};

use crate::constants::NOTIFICATION_DURATION_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Info,
    Success,
    Warning,
    Error,
}

crate::impl_domain_status_conversions!(NotificationVariant {
    Info => "info",
    Success => "success",
    Warning => "warning",
    Error => "error",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// `{variant, title, description, position?, durationMs?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub variant: NotificationVariant,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<NotificationPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Notification {
    pub fn new(
        variant: NotificationVariant,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            variant,
            title: title.into(),
            description: description.into(),
            position: Some(NotificationPosition::TopRight),
            duration_ms: Some(NOTIFICATION_DURATION_MS),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Error, title, description)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Warning, title, description)
    }
}
