//! User-visible notifications.
//!
//! Failures that must not interrupt the current view (a paper that could not
//! be resolved, a PDF that could not be downloaded) are reported here instead
//! of being returned to the caller. Each research session owns a `Notifier`
//! and the web server streams it to that session's page over SSE.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Cloneable handle to a broadcast channel of [`Notice`]s.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice { level, message: message.into() };
        match level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Notice"),
            _ => tracing::debug!(message = %notice.message, "Notice"),
        }
        // No subscribers is fine: nobody is looking at the page.
        let _ = self.tx.send(notice);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, message);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_notices() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();

        notifier.error("Failed to fetch PDF");
        notifier.info("Copied");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.level, NoticeLevel::Error);
        assert_eq!(first.message, "Failed to fetch PDF");
        assert_eq!(rx.recv().await.unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let notifier = Notifier::new(4);
        notifier.error("nobody listening");
    }

    #[test]
    fn test_notice_serializes_snake_case() {
        let notice = Notice { level: NoticeLevel::Error, message: "ok".to_string() };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["level"], "error");
    }
}
