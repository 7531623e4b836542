//! Port interfaces for user-visible side effects
//!
//! These traits define the boundary between session logic and whatever
//! renders toasts and owns the current location.

use gatehouse_domain::Notification;

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Current location plus the ability to leave it
pub trait Navigator: Send + Sync {
    /// Path of the current location, query string included if any
    fn current_path(&self) -> String;

    /// Navigate to `path`
    fn redirect(&self, path: &str);
}

/// Notifier that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notification: Notification) {}
}
