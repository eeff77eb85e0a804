//! Notification Center - Transient toast messages
//!
//! Toasts are listed in insertion order and disappear once their display
//! duration has elapsed or they are dismissed. Front ends either poll
//! [`NotificationCenter::visible`] or follow new toasts via
//! [`NotificationCenter::subscribe`].

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::entities::ToastMessage;
use crate::domain::value_objects::Severity;

/// How long a toast stays visible
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

const SUBSCRIBER_CAPACITY: usize = 64;

struct Entry {
    toast: ToastMessage,
    expires_at: Instant,
}

pub struct NotificationCenter {
    entries: Mutex<Vec<Entry>>,
    duration: Duration,
    sender: broadcast::Sender<ToastMessage>,
}

impl NotificationCenter {
    pub fn new(duration: Duration) -> Self {
        let (sender, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            entries: Mutex::new(Vec::new()),
            duration,
            sender,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Show a toast; returns its id for early dismissal
    pub fn notify(&self, text: impl Into<String>, severity: Severity) -> Uuid {
        let toast = ToastMessage::new(text, severity, self.duration);
        let id = toast.id;

        match severity {
            Severity::Danger => tracing::error!(toast_id = %id, "{}", toast.text),
            Severity::Warning => tracing::warn!(toast_id = %id, "{}", toast.text),
            Severity::Info | Severity::Success => {
                tracing::info!(toast_id = %id, severity = %severity, "{}", toast.text)
            }
        }

        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|e| e.expires_at > now);
        entries.push(Entry {
            toast: toast.clone(),
            expires_at: now + self.duration,
        });
        drop(entries);

        // No subscribers is fine
        let _ = self.sender.send(toast);
        id
    }

    pub fn success(&self, text: impl Into<String>) -> Uuid {
        self.notify(text, Severity::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> Uuid {
        self.notify(text, Severity::Danger)
    }

    pub fn warning(&self, text: impl Into<String>) -> Uuid {
        self.notify(text, Severity::Warning)
    }

    pub fn info(&self, text: impl Into<String>) -> Uuid {
        self.notify(text, Severity::Info)
    }

    /// Remove a toast before it expires
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.toast.id != id);
        entries.len() != before
    }

    /// Toasts that are still on screen, oldest first
    pub fn visible(&self) -> Vec<ToastMessage> {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|e| e.expires_at > now);
        entries.iter().map(|e| e.toast.clone()).collect()
    }

    /// Receive every toast posted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ToastMessage> {
        self.sender.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_toasts_listed_in_insertion_order() {
        let center = NotificationCenter::default();
        center.info("first");
        center.success("second");
        center.error("third");

        let visible = center.visible();
        let texts: Vec<_> = visible.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(visible[1].severity, Severity::Success);
        assert_eq!(visible[2].severity, Severity::Danger);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_expires_after_duration() {
        let center = NotificationCenter::new(Duration::from_secs(5));
        center.warning("short lived");

        tokio::time::advance(Duration::from_millis(4999)).await;
        assert_eq!(center.visible().len(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(center.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_toasts_pruned_on_notify() {
        let center = NotificationCenter::new(Duration::from_secs(1));

        for n in 0..20 {
            center.error(format!("failure {}", n));
            tokio::time::advance(Duration::from_secs(2)).await;
        }
        assert_eq!(center.lock().len(), 1);

        center.info("fresh");
        assert_eq!(center.lock().len(), 1);
        assert_eq!(center.visible()[0].text, "fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_removes_early() {
        let center = NotificationCenter::default();
        let keep = center.info("keep");
        let drop_me = center.error("drop");

        assert!(center.dismiss(drop_me));
        assert!(!center.dismiss(drop_me));

        let visible = center.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, keep);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_receive_new_toasts() {
        let center = NotificationCenter::default();
        let mut rx = center.subscribe();

        center.error("API request failed");

        let toast = rx.recv().await.unwrap();
        assert_eq!(toast.text, "API request failed");
        assert_eq!(toast.severity, Severity::Danger);
        assert_eq!(toast.auto_dismiss_after, DEFAULT_TOAST_DURATION);
    }
}
