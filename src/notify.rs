//! User-facing transient notifications ("toasts").
//!
//! DESIGN
//! ======
//! Stores report the outcome of every operation here, then swallow the error.
//! Wording is fixed per operation by an [`OpLabel`] so front ends render the
//! same text: `"Login successful!"`, `"Login failed."`,
//! `"Unable to login: <reason>"`.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::sync::Mutex;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// Display names for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpLabel {
    /// Sentence-start form, e.g. `"Find by ID"`.
    pub title: &'static str,
    /// Mid-sentence form, e.g. `"find by ID"`.
    pub verb: &'static str,
}

impl OpLabel {
    #[must_use]
    pub const fn new(title: &'static str, verb: &'static str) -> Self {
        Self { title, verb }
    }

    #[must_use]
    pub fn succeeded(self) -> String {
        format!("{} successful!", self.title)
    }

    /// The request completed but with a status other than the expected one.
    #[must_use]
    pub fn failed(self) -> String {
        format!("{} failed.", self.title)
    }

    #[must_use]
    pub fn unable(self, reason: &str) -> String {
        if reason.is_empty() { format!("Unable to {}", self.verb) } else { format!("Unable to {}: {reason}", self.verb) }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification { level: Level::Success, message: message.to_owned() });
    }

    fn error(&self, message: &str) {
        self.notify(Notification { level: Level::Error, message: message.to_owned() });
    }
}

fn trace(notification: &Notification) {
    match notification.level {
        Level::Success => info!(text = %notification.message, "notify"),
        Level::Error => warn!(text = %notification.message, "notify"),
    }
}

/// Sends notifications to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        trace(&notification);
    }
}

/// Keeps notifications until a front end drains them.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *entries)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).last().cloned()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        trace(&notification);
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(notification);
    }
}
