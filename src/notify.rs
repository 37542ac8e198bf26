//! Unread counter and short-lived toasts.

use crate::telemetry::LogLevel;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// How long a toast stays visible unless dismissed earlier.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub severity: LogLevel,
}

#[derive(Debug, Default)]
struct Inner {
    unread: u64,
    toasts: Vec<Toast>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSnapshot {
    pub unread_count: u64,
    pub toasts: Vec<Toast>,
}

/// Shared notification state. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn unread_count(&self) -> u64 {
        self.lock().unread
    }

    pub fn add_unread(&self) {
        self.lock().unread += 1;
    }

    pub fn clear_unread(&self) {
        self.lock().unread = 0;
    }

    /// Show a toast that removes itself after [`TOAST_TTL`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn show_toast(&self, message: impl Into<String>, severity: LogLevel) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        };
        let id = toast.id;
        self.lock().toasts.push(toast);

        let center = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(TOAST_TTL).await;
            center.dismiss_toast(id);
        });
        id
    }

    pub fn show_info(&self, message: impl Into<String>) -> Uuid {
        self.show_toast(message, LogLevel::Info)
    }

    /// Remove a toast. Unknown ids are ignored.
    pub fn dismiss_toast(&self, id: Uuid) {
        self.lock().toasts.retain(|t| t.id != id);
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.clone()
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        let inner = self.lock();
        NotificationSnapshot {
            unread_count: inner.unread,
            toasts: inner.toasts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_counter() {
        let center = NotificationCenter::new();
        center.add_unread();
        center.clone().add_unread();
        assert_eq!(center.unread_count(), 2);
        center.clear_unread();
        assert_eq!(center.unread_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_expires() {
        let center = NotificationCenter::new();
        center.show_info("Settings saved");
        assert_eq!(center.toasts().len(), 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(center.toasts().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(center.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_toast() {
        let center = NotificationCenter::new();
        let keep = center.show_toast("Anomaly detected", LogLevel::Warning);
        let gone = center.show_toast("Export failed", LogLevel::Error);
        center.dismiss_toast(gone);
        center.dismiss_toast(gone);

        let toasts = center.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].id, keep);
    }
}
