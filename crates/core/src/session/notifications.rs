//! Error-to-notification table
//!
//! Maps a normalized [`ApiError`] to the toast shown to the user and whether
//! the failure should send the user back to the sign-in entry point.

use gatehouse_domain::{ApiError, ApiErrorKind, Notification};

/// Where the error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    /// The sign-in call itself; the user is already on the sign-in surface
    Login,
    /// Any call made with an established session
    Session,
}

/// What the user sees for one error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub notification: Notification,
    pub redirect_to_sign_in: bool,
}

impl ErrorReport {
    fn notify(notification: Notification) -> Self {
        Self { notification, redirect_to_sign_in: false }
    }
}

/// Look up the notification for `err`. `None` means the error is surfaced to
/// the caller without a toast.
pub fn notification_for(err: &ApiError, context: ErrorContext) -> Option<ErrorReport> {
    let report = match (err.kind, err.code) {
        (ApiErrorKind::Unauthorized, _) => match context {
            ErrorContext::Login => ErrorReport::notify(Notification::error(
                "Sign-in failed",
                "The email or password is incorrect.",
            )),
            ErrorContext::Session => ErrorReport {
                notification: Notification::warning(
                    "Session expired",
                    "Your session has expired. Please sign in again.",
                ),
                redirect_to_sign_in: true,
            },
        },
        (ApiErrorKind::Client, 403) => ErrorReport::notify(Notification::error(
            "Forbidden",
            "You do not have permission to perform this action.",
        )),
        (ApiErrorKind::Client, 422) => {
            ErrorReport::notify(Notification::warning("Validation failed", err.message.clone()))
        }
        (ApiErrorKind::Server, _) => ErrorReport::notify(Notification::error(
            "Server error",
            "The server could not complete the request. Please try again later.",
        )),
        (ApiErrorKind::Network, _) => ErrorReport::notify(Notification::error(
            "Network error",
            "Unable to reach the server. Check your connection.",
        )),
        (ApiErrorKind::Timeout, _) => ErrorReport::notify(Notification::error(
            "Request timed out",
            "The server took too long to respond.",
        )),
        (ApiErrorKind::Client | ApiErrorKind::Local, _) => return None,
    };
    Some(report)
}

#[cfg(test)]
mod tests {
    use gatehouse_domain::NotificationVariant;

    use super::*;

    #[test]
    fn session_401_redirects() {
        let report =
            notification_for(&ApiError::unauthorized("expired"), ErrorContext::Session).unwrap();
        assert_eq!(report.notification.title, "Session expired");
        assert!(report.redirect_to_sign_in);
    }

    #[test]
    fn login_401_is_labelled_differently_and_stays_put() {
        let report =
            notification_for(&ApiError::unauthorized("bad"), ErrorContext::Login).unwrap();
        assert_eq!(report.notification.title, "Sign-in failed");
        assert!(!report.redirect_to_sign_in);
    }

    #[test]
    fn status_table() {
        let cases = [
            (ApiError::from_status(403, "no"), "Forbidden"),
            (ApiError::from_status(422, "email is required"), "Validation failed"),
            (ApiError::from_status(503, "down"), "Server error"),
            (ApiError::network("refused"), "Network error"),
            (ApiError::timeout("slow"), "Request timed out"),
        ];
        for (err, title) in cases {
            let report = notification_for(&err, ErrorContext::Session).unwrap();
            assert_eq!(report.notification.title, title, "{err}");
            assert!(!report.redirect_to_sign_in);
        }
    }

    #[test]
    fn validation_carries_server_message() {
        let report = notification_for(
            &ApiError::from_status(422, "email is required"),
            ErrorContext::Session,
        )
        .unwrap();
        assert_eq!(report.notification.description, "email is required");
        assert_eq!(report.notification.variant, NotificationVariant::Warning);
    }

    #[test]
    fn unlisted_errors_have_no_toast() {
        assert!(notification_for(&ApiError::from_status(404, "gone"), ErrorContext::Session)
            .is_none());
        assert!(notification_for(&ApiError::local("no refresh token"), ErrorContext::Session)
            .is_none());
    }
}
