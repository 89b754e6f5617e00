//! User-facing notifications.
//!
//! The form reports outcomes such as "exported successfully" or "failed to connect" through the
//! `Notifier` capability and is otherwise unaware of how they are displayed.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{error, info};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Danger,
}

serde_plain::derive_display_from_serialize!(Severity);

/// Displays a message to the user.
pub trait Notifier {
    fn show(&self, message: &str, severity: Severity);
}

/// A notification that was shown.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// Shows notifications by logging them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Danger => error!("{message}"),
            Severity::Info | Severity::Success => info!("{message}"),
        }
    }
}

/// Collects notifications until they are drained, e.g. to return them from an MCP tool call.
#[derive(Debug, Default)]
pub struct Notifications {
    shown: Mutex<Vec<Notification>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything shown so far.
    pub fn drain(&self) -> Vec<Notification> {
        match self.shown.lock() {
            Ok(mut shown) => std::mem::take(&mut *shown),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for Notifications {
    fn show(&self, message: &str, severity: Severity) {
        let notification = Notification {
            message: message.to_string(),
            severity,
        };
        match self.shown.lock() {
            Ok(mut shown) => shown.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
