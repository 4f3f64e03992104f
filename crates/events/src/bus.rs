//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the broker behind every named queue. Publishing puts a
//! [`ChurchEvent`] on the channel; the queue consumers registered in
//! [`RouteTable`](crate::routes::RouteTable) each pick out the event types
//! bound to their queue.

use chrono::{DateTime, Utc};
use church_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event type names, one per queue binding.
pub mod event_types {
    pub const MEMBER_CREATED: &str = "member.created";
    pub const DONATION_CREATED: &str = "donation.created";
    pub const EMAIL_NOTIFICATION: &str = "email.notification";
    pub const ERROR: &str = "error";
}

// ---------------------------------------------------------------------------
// ChurchEvent
// ---------------------------------------------------------------------------

/// Envelope carried on the bus.
///
/// The payload is the JSON-marshalled message body; consumers unmarshal it
/// into the shape they expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurchEvent {
    /// Dot-separated event name, e.g. `"member.created"`.
    pub event_type: String,

    /// Optional source entity kind (e.g. `"member"`, `"donation"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl ChurchEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process event broker.
///
/// ```rust
/// use church_events::bus::{ChurchEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ChurchEvent::new("member.created"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ChurchEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of subscribers that will see it; zero means the
    /// event was dropped.
    pub fn publish(&self, event: ChurchEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(event_type = %event.event_type, "No subscribers, event dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChurchEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = ChurchEvent::new(event_types::MEMBER_CREATED)
            .with_source("member", 42)
            .with_actor(Some(7))
            .with_payload(serde_json::json!({"email": "a@example.com"}));

        assert_eq!(bus.publish(event), 1);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "member.created");
        assert_eq!(received.source_entity_type.as_deref(), Some("member"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["email"], "a@example.com");
    }

    #[test]
    fn publish_with_no_subscribers_reports_zero() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(ChurchEvent::new("orphan.event")), 0);
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = ChurchEvent::new("bare.event");
        assert!(event.source_entity_type.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
    }
}
