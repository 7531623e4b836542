//! Recording implementations of the side-effect ports

use std::sync::Arc;

use gatehouse_domain::Notification;
use parking_lot::Mutex;

use crate::ports::{Navigator, Notifier};

/// Notifier that keeps everything it was handed
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notifications.lock().iter().map(|n| n.title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}

/// Navigator that tracks the current path and every redirect
#[derive(Debug, Clone)]
pub struct RecordingNavigator {
    current: Arc<Mutex<String>>,
    redirects: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self { current: Arc::new(Mutex::new(path.into())), redirects: Arc::default() }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }

    /// Move without recording a redirect
    pub fn visit(&self, path: impl Into<String>) {
        *self.current.lock() = path.into();
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::at("/")
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    fn redirect(&self, path: &str) {
        self.redirects.lock().push(path.to_string());
        *self.current.lock() = path.to_string();
    }
}
