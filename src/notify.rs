//! Structured notifications for the host message queue.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A message for the host notification queue.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    /// Persistent notifications stay visible until dismissed by key.
    pub persistent: bool,
    pub dismiss_key: String,
}

static KEY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Millisecond timestamp plus sequence; unique within a process run.
fn next_dismiss_key() -> String {
    let seq = KEY_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{ms}-{seq}", ms = Utc::now().timestamp_millis())
}

impl Notification {
    /// Transient success message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
            persistent: false,
            dismiss_key: next_dismiss_key(),
        }
    }

    /// Failure message; persists until the user dismisses it.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            persistent: true,
            dismiss_key: next_dismiss_key(),
        }
    }
}

/// Host-owned notification queue.
///
/// The orchestrator only enqueues and dismisses; queue rendering and
/// retention policy belong to the host.
pub trait NotificationSink {
    fn enqueue(&mut self, notification: Notification);
    fn dismiss(&mut self, key: &str);
}

/// Sink that logs through tracing and retains entries.
///
/// Serves the CLI (where the log is the notification surface) and tests.
#[derive(Debug, Default)]
pub struct LogSink {
    entries: Vec<Notification>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|n| n.severity == Severity::Error)
    }
}

impl NotificationSink for LogSink {
    fn enqueue(&mut self, notification: Notification) {
        match notification.severity {
            Severity::Success => tracing::info!("{}", notification.message),
            Severity::Error => tracing::error!("{}", notification.message),
        }
        self.entries.push(notification);
    }

    fn dismiss(&mut self, key: &str) {
        self.entries.retain(|n| n.dismiss_key != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_is_persistent_error() {
        let n = Notification::failure("Failed to export: DB down");
        assert_eq!(n.severity, Severity::Error);
        assert!(n.persistent);
    }

    #[test]
    fn test_success_is_transient() {
        let n = Notification::success("Import All successful");
        assert_eq!(n.severity, Severity::Success);
        assert!(!n.persistent);
    }

    #[test]
    fn test_dismiss_keys_are_unique() {
        let a = Notification::success("a");
        let b = Notification::success("b");
        assert_ne!(a.dismiss_key, b.dismiss_key);
    }

    #[test]
    fn test_log_sink_dismiss_by_key() {
        let mut sink = LogSink::new();
        let n = Notification::failure("oops");
        let key = n.dismiss_key.clone();
        sink.enqueue(n);
        sink.enqueue(Notification::success("ok"));
        assert_eq!(sink.entries().len(), 2);
        assert!(sink.has_errors());

        sink.dismiss(&key);
        assert_eq!(sink.entries().len(), 1);
        assert!(!sink.has_errors());
    }
}
