// Live feed - forwards pushed snapshot arrays to the card updater
use crate::application::cards::CardUpdater;
use crate::domain::snapshot::Snapshot;
use futures::{Stream, StreamExt};
use std::time::Duration;

/// Reconnect schedule for the push connection: exponential backoff that
/// doubles up to `max_backoff`, reset after every successful connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(30_000),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    pub fn backoff(&self) -> Backoff {
        Backoff {
            policy: *self,
            next: self.initial_backoff,
            attempts: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    next: Duration,
    attempts: u32,
}

impl Backoff {
    /// Delay before the next reconnect, or `None` once the attempt cap
    /// has been reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.policy.max_attempts.is_some_and(|max| self.attempts >= max) {
            return None;
        }
        self.attempts += 1;
        let delay = self.next.min(self.policy.max_backoff);
        self.next = (self.next * 2).min(self.policy.max_backoff);
        Some(delay)
    }

    pub fn reset(&mut self) {
        self.next = self.policy.initial_backoff;
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Decodes one pushed message. Anything but a snapshot array is rejected.
pub fn decode_message(data: &str) -> Result<Vec<Snapshot>, serde_json::Error> {
    serde_json::from_str(data)
}

/// Drains `messages`, handing each decoded snapshot array to the card
/// updater whole. Malformed messages are logged and skipped. Returns the
/// number of arrays forwarded.
pub async fn pump<S>(messages: S, cards: &CardUpdater) -> usize
where
    S: Stream<Item = String>,
{
    let mut messages = std::pin::pin!(messages);
    let mut forwarded = 0;
    while let Some(data) = messages.next().await {
        match decode_message(&data) {
            Ok(snapshots) => {
                tracing::debug!("Feed message with {} snapshots", snapshots.len());
                cards.update_entity_cards(&snapshots);
                forwarded += 1;
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed feed message: {}", e);
            }
        }
    }
    tracing::info!("Live feed ended after {} messages", forwarded);
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::document::Document;
    use crate::infrastructure::layout;
    use crate::infrastructure::memory_document::MemoryDocument;
    use std::sync::Arc;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            max_attempts: None,
        };
        let mut backoff = policy.backoff();
        let delays: Vec<u64> = (0..5)
            .map(|_| backoff.next_delay().unwrap().as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 5, 5]);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_backoff_attempt_cap() {
        let policy = ReconnectPolicy {
            max_attempts: Some(2),
            ..Default::default()
        };
        let mut backoff = policy.backoff();
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert_eq!(backoff.next_delay(), None);
        assert_eq!(backoff.attempts(), 2);
    }

    #[tokio::test]
    async fn test_pump_forwards_and_skips_garbage() {
        let document = Arc::new(MemoryDocument::new());
        layout::scaffold_device_card(&document, "d1");
        let cards = CardUpdater::new(document.clone());

        let messages = futures::stream::iter(vec![
            "not json".to_string(),
            r#"[{"device_id": "d1", "last_data": {"temperature": 21.4}, "connection_status": "connected"}]"#
                .to_string(),
            r#"{"device_id": "d1"}"#.to_string(),
        ]);
        assert_eq!(pump(messages, &cards).await, 1);
        assert_eq!(document.text("temp-d1").as_deref(), Some("21.4"));
        assert!(document.has_class("device-card-d1", "status-connected"));
    }

    #[tokio::test]
    async fn test_null_status_does_not_drop_other_cards() {
        let document = Arc::new(MemoryDocument::new());
        layout::scaffold_device_card(&document, "d1");
        layout::scaffold_device_card(&document, "d2");
        let cards = CardUpdater::new(document.clone());

        let messages = futures::stream::iter(vec![r#"[
            {"device_id": "d1", "last_data": {"temperature": 21.4}, "connection_status": "connected"},
            {"device_id": "d2", "connection_status": null}
        ]"#
        .to_string()]);
        assert_eq!(pump(messages, &cards).await, 1);
        assert_eq!(document.text("temp-d1").as_deref(), Some("21.4"));
        assert!(document.has_class("device-card-d1", "status-connected"));
        assert!(document.has_class("device-card-d2", "status-no_data"));
    }
}
