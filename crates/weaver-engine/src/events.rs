//! User-facing notifications
//!
//! Every session outcome, success or failure, is reported as a short titled
//! notification. The sink abstracts over where they go (terminal, channel,
//! test buffer).

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A transient message describing the outcome of a user action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Trait for delivering notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// A sink that discards everything
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {
    fn notify(&self, _notification: Notification) {}
}

/// A vector-based sink that collects notifications
///
/// Useful for testing to verify what the user would have seen.
pub struct VecNotificationSink {
    notifications: Mutex<Vec<Notification>>,
}

impl VecNotificationSink {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Get all collected notifications
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Title of the most recent notification
    pub fn last_title(&self) -> Option<String> {
        self.notifications.lock().last().map(|n| n.title.clone())
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }
}

impl Default for VecNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for VecNotificationSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}
