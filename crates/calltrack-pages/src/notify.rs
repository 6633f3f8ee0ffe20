//! Transient notifications raised by page actions

use serde::{Deserialize, Serialize};

/// Toast severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    /// The action worked
    Success,
    /// The action failed
    Error,
}

/// A short-lived message for the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toast {
    /// Severity
    pub kind: ToastKind,
    /// Headline
    pub title: String,
    /// Detail line
    pub description: String,
}

impl Toast {
    /// Success toast
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Error toast
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Toasts queued by a controller until the page shows them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toasts(Vec<Toast>);

impl Toasts {
    /// Queue a toast
    pub fn push(&mut self, toast: Toast) {
        self.0.push(toast);
    }

    /// Take every queued toast
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.0)
    }

    /// Queued toasts, oldest first
    pub fn pending(&self) -> &[Toast] {
        &self.0
    }
}
