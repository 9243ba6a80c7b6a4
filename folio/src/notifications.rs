//! User-facing notification events.
//!
//! Controllers never talk to a UI. They emit [`Notification`]s through a [`Notifier`], and the HTTP
//! layer collects whatever was emitted while handling a request into a [`NotificationBuffer`] and
//! renders it alongside the response body.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A toast-style message for the person who triggered an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.into(),
            description: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            description: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Sink for notification events. Fire and forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Collects notifications in emission order until drained.
#[derive(Debug, Clone, Default)]
pub struct NotificationBuffer {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything emitted so far, leaving the buffer empty
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Notifier for NotificationBuffer {
    fn notify(&self, notification: Notification) {
        tracing::debug!(severity = ?notification.severity, title = %notification.title, "notification emitted");
        self.inner.lock().push(notification);
    }
}
