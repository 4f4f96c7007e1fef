//! Notification system — routes campaign events to the best available sink.
//! Lightweight: no queues, no Redis. Just pick a sink and deliver.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use blastline_core::error::Result;

/// A notification for the campaign owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Title/summary.
    pub title: String,
    /// Body content.
    pub body: String,
    /// Priority: low, normal, high, urgent.
    pub priority: NotifyPriority,
    /// Source (which component emitted this).
    pub source: String,
    /// Timestamp.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Notification priority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NotifyPriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// A destination notifications can be delivered to.
#[async_trait]
pub trait NotifySink: Send + Sync {
    /// Sink name ("tracing", "webhook", ...).
    fn name(&self) -> &str;

    async fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Sink that writes notifications to the log. Always available, never fails.
pub struct TracingSink;

#[async_trait]
impl NotifySink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn deliver(&self, notification: &Notification) -> Result<()> {
        tracing::info!("📣 [{}] {}", notification.title, notification.body);
        Ok(())
    }
}

/// Notification router — records every notification and delivers it through
/// the first sink that accepts it.
pub struct NotifyRouter {
    sinks: Vec<Arc<dyn NotifySink>>,
    /// Notification history (in-memory ring buffer, max 100).
    history: std::sync::Mutex<Vec<Notification>>,
}

impl NotifyRouter {
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            history: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_sinks(sinks: Vec<Arc<dyn NotifySink>>) -> Self {
        Self {
            sinks,
            history: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Register a sink. Earlier sinks are preferred.
    pub fn register(&mut self, sink: Arc<dyn NotifySink>) {
        self.sinks.push(sink);
    }

    /// Record and deliver. Delivery failures are logged, never propagated;
    /// a notification must not be able to break the campaign that sent it.
    pub async fn send(&self, notification: Notification) {
        self.record(notification.clone());

        for sink in &self.sinks {
            match sink.deliver(&notification).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!("⚠️ Notify sink '{}' failed: {e}", sink.name());
                }
            }
        }
        if self.sinks.is_empty() {
            tracing::debug!("No notify sinks registered; '{}' kept in history only", notification.title);
        }
    }

    /// Record a notification in history.
    pub fn record(&self, notification: Notification) {
        let mut history = self.history.lock().unwrap();
        history.push(notification);
        // Ring buffer — keep last 100
        if history.len() > 100 {
            history.remove(0);
        }
    }

    /// Get notification history.
    pub fn history(&self) -> Vec<Notification> {
        self.history.lock().unwrap().clone()
    }

    /// Create a notification.
    pub fn create(title: &str, body: &str, source: &str, priority: NotifyPriority) -> Notification {
        Notification {
            title: title.to_string(),
            body: body.to_string(),
            priority,
            source: source.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl Default for NotifyRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blastline_core::error::BlastlineError;

    struct RejectingSink;

    #[async_trait]
    impl NotifySink for RejectingSink {
        fn name(&self) -> &str {
            "rejecting"
        }

        async fn deliver(&self, _notification: &Notification) -> Result<()> {
            Err(BlastlineError::Channel("sink offline".into()))
        }
    }

    struct CountingSink {
        delivered: std::sync::Mutex<usize>,
    }

    #[async_trait]
    impl NotifySink for CountingSink {
        fn name(&self) -> &str {
            "counting"
        }

        async fn deliver(&self, _notification: &Notification) -> Result<()> {
            *self.delivered.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn falls_over_to_next_sink() {
        let counting = Arc::new(CountingSink {
            delivered: std::sync::Mutex::new(0),
        });
        let sinks: Vec<Arc<dyn NotifySink>> = vec![Arc::new(RejectingSink), counting.clone()];
        let router = NotifyRouter::with_sinks(sinks);

        let n = NotifyRouter::create("t", "b", "test", NotifyPriority::Normal);
        router.send(n).await;

        assert_eq!(*counting.delivered.lock().unwrap(), 1);
        assert_eq!(router.history().len(), 1);
    }

    #[tokio::test]
    async fn registered_sink_receives_deliveries() {
        let counting = Arc::new(CountingSink {
            delivered: std::sync::Mutex::new(0),
        });
        let mut router = NotifyRouter::new();
        router.register(counting.clone());

        let n = NotifyRouter::create("t", "b", "test", NotifyPriority::High);
        router.send(n).await;

        assert_eq!(*counting.delivered.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn send_without_sinks_still_records() {
        let router = NotifyRouter::new();
        let n = NotifyRouter::create("t", "b", "test", NotifyPriority::Low);
        router.send(n).await;
        assert_eq!(router.history().len(), 1);
    }

    #[test]
    fn history_is_a_ring_buffer() {
        let router = NotifyRouter::new();
        for i in 0..105 {
            router.record(NotifyRouter::create(
                &format!("n{i}"),
                "b",
                "test",
                NotifyPriority::Low,
            ));
        }
        let history = router.history();
        assert_eq!(history.len(), 100);
        assert_eq!(history[0].title, "n5");
        assert_eq!(history[99].title, "n104");
    }
}
