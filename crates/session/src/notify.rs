//! User-facing notifications
//!
//! The session subsystem never blocks on a notification. `TracingNotifier` is
//! the default adapter; `ChannelNotifier` forwards events to a UI loop.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;

/// Sink for messages shown to the user
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warn,
    Error,
}

/// A single notification event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Logs notifications through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!(notification = %message, "User notification");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(notification = %message, "User notification");
    }

    fn error(&self, message: &str) {
        tracing::error!(notification = %message, "User notification");
    }
}

/// Emits notifications on an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end for the UI loop
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn emit(&self, level: NotificationLevel, message: &str) {
        if self.sender.send(Notification::new(level, message)).is_err() {
            tracing::debug!(notification = %message, "Notification receiver dropped");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn info(&self, message: &str) {
        self.emit(NotificationLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(NotificationLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(NotificationLevel::Error, message);
    }
}

/// Keeps every notification in memory for later inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications so far, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }

    fn record(&self, level: NotificationLevel, message: &str) {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Notification::new(level, message));
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.record(NotificationLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(NotificationLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(NotificationLevel::Error, message);
    }
}
