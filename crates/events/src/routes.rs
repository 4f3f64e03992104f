//! Queue bindings and consumer loops.
//!
//! A [`Queue`] binds one event type on the [`EventBus`]. The [`RouteTable`]
//! holds at most one consumer per queue, so an event never reaches two
//! handlers. A failing consumer has its error forwarded to the
//! [`Queue::Error`] consumer; failures there are only traced.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::audit::AuditError;
use crate::bus::{event_types, ChurchEvent, EventBus};
use crate::email::EmailError;

// ---------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Queue {
    MemberCreated,
    DonationCreated,
    EmailNotification,
    Error,
}

impl Queue {
    pub const ALL: [Queue; 4] = [
        Queue::MemberCreated,
        Queue::DonationCreated,
        Queue::EmailNotification,
        Queue::Error,
    ];

    /// The event type this queue is bound to.
    pub fn event_type(self) -> &'static str {
        match self {
            Queue::MemberCreated => event_types::MEMBER_CREATED,
            Queue::DonationCreated => event_types::DONATION_CREATED,
            Queue::EmailNotification => event_types::EMAIL_NOTIFICATION,
            Queue::Error => event_types::ERROR,
        }
    }

    pub fn accepts(self, event: &ChurchEvent) -> bool {
        event.event_type == self.event_type()
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_type())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Queue {0} already has a consumer")]
    DuplicateConsumer(Queue),

    #[error("Invalid message payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

// ---------------------------------------------------------------------------
// Consumers
// ---------------------------------------------------------------------------

/// Handles every event delivered to one queue.
#[async_trait]
pub trait QueueConsumer: Send + Sync {
    async fn handle(&self, event: &ChurchEvent) -> Result<(), RouteError>;
}

#[derive(Default)]
pub struct RouteTable {
    consumers: BTreeMap<Queue, Arc<dyn QueueConsumer>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        queue: Queue,
        consumer: Arc<dyn QueueConsumer>,
    ) -> Result<(), RouteError> {
        if self.consumers.contains_key(&queue) {
            return Err(RouteError::DuplicateConsumer(queue));
        }
        self.consumers.insert(queue, consumer);
        Ok(())
    }

    pub fn queues(&self) -> impl Iterator<Item = Queue> + '_ {
        self.consumers.keys().copied()
    }

    /// Subscribe every registered consumer and spawn its loop.
    ///
    /// Subscriptions are taken before this returns, so events published
    /// afterwards are never missed.
    pub fn start(self, bus: Arc<EventBus>) -> RouteHandles {
        let handles = RouteHandles {
            queues: TaskTracker::new(),
            queues_cancel: CancellationToken::new(),
            errors: TaskTracker::new(),
            errors_cancel: CancellationToken::new(),
        };

        for (queue, consumer) in self.consumers {
            let receiver = bus.subscribe();
            let (tracker, cancel) = if queue == Queue::Error {
                (&handles.errors, handles.errors_cancel.clone())
            } else {
                (&handles.queues, handles.queues_cancel.clone())
            };
            tracker.spawn(run_consumer(queue, consumer, Arc::clone(&bus), receiver, cancel));
            tracing::info!(%queue, "Queue consumer started");
        }

        handles
    }
}

/// Running consumer loops.
pub struct RouteHandles {
    queues: TaskTracker,
    queues_cancel: CancellationToken,
    errors: TaskTracker,
    errors_cancel: CancellationToken,
}

impl RouteHandles {
    /// Stop every loop after it drains the events already queued for it.
    /// The error consumer stops last so it still sees failures raised
    /// while the other queues drain.
    pub async fn shutdown(self) {
        self.queues_cancel.cancel();
        self.queues.close();
        self.queues.wait().await;

        self.errors_cancel.cancel();
        self.errors.close();
        self.errors.wait().await;
        tracing::info!("Queue consumers stopped");
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

async fn run_consumer(
    queue: Queue,
    consumer: Arc<dyn QueueConsumer>,
    bus: Arc<EventBus>,
    mut receiver: broadcast::Receiver<ChurchEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                drain(queue, consumer.as_ref(), &bus, &mut receiver).await;
                break;
            }
            received = receiver.recv() => match received {
                Ok(event) => dispatch(queue, consumer.as_ref(), &bus, &event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(%queue, skipped = n, "Queue consumer lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(%queue, "Event bus closed, consumer shutting down");
                    break;
                }
            }
        }
    }
}

async fn drain(
    queue: Queue,
    consumer: &dyn QueueConsumer,
    bus: &EventBus,
    receiver: &mut broadcast::Receiver<ChurchEvent>,
) {
    loop {
        match receiver.try_recv() {
            Ok(event) => dispatch(queue, consumer, bus, &event).await,
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                tracing::warn!(%queue, skipped = n, "Queue consumer lagged while draining");
            }
            Err(_) => break,
        }
    }
}

async fn dispatch(queue: Queue, consumer: &dyn QueueConsumer, bus: &EventBus, event: &ChurchEvent) {
    if !queue.accepts(event) {
        return;
    }
    tracing::debug!(%queue, payload = %event.payload, "Received message");

    let Err(err) = consumer.handle(event).await else {
        return;
    };

    tracing::error!(%queue, error = %err, "Error in route");
    if queue == Queue::Error {
        return;
    }

    let mut report = ChurchEvent::new(event_types::ERROR)
        .with_actor(event.actor_user_id)
        .with_payload(json!({
            "queue": queue.event_type(),
            "error": err.to_string(),
            "message": event.payload,
        }));
    if let (Some(kind), Some(id)) = (&event.source_entity_type, event.source_entity_id) {
        report = report.with_source(kind.clone(), id);
    }
    bus.publish(report);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ChurchEvent>>,
        fail: bool,
    }

    impl Recorder {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn seen(&self) -> Vec<ChurchEvent> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueueConsumer for Recorder {
        async fn handle(&self, event: &ChurchEvent) -> Result<(), RouteError> {
            self.seen.lock().unwrap().push(event.clone());
            if self.fail {
                return Err(EmailError::SendingFailed("boom".into()).into());
            }
            Ok(())
        }
    }

    #[test]
    fn second_consumer_for_a_queue_is_rejected() {
        let mut table = RouteTable::new();
        table
            .register(Queue::MemberCreated, Arc::new(Recorder::default()))
            .unwrap();
        assert_matches!(
            table.register(Queue::MemberCreated, Arc::new(Recorder::default())),
            Err(RouteError::DuplicateConsumer(Queue::MemberCreated))
        );
        assert_eq!(table.queues().count(), 1);
    }

    #[test]
    fn queues_bind_distinct_event_types() {
        let mut types: Vec<_> = Queue::ALL.iter().map(|q| q.event_type()).collect();
        types.dedup();
        assert_eq!(types.len(), Queue::ALL.len());
        assert!(Queue::Error.accepts(&ChurchEvent::new("error")));
        assert!(!Queue::Error.accepts(&ChurchEvent::new("member.created")));
    }

    #[tokio::test]
    async fn each_queue_sees_only_its_events() {
        let bus = Arc::new(EventBus::default());
        let members = Arc::new(Recorder::default());
        let donations = Arc::new(Recorder::default());

        let mut table = RouteTable::new();
        table.register(Queue::MemberCreated, members.clone()).unwrap();
        table.register(Queue::DonationCreated, donations.clone()).unwrap();
        let handles = table.start(Arc::clone(&bus));

        bus.publish(ChurchEvent::new(event_types::MEMBER_CREATED));
        bus.publish(ChurchEvent::new(event_types::DONATION_CREATED));
        bus.publish(ChurchEvent::new(event_types::MEMBER_CREATED));
        handles.shutdown().await;

        assert_eq!(members.seen().len(), 2);
        assert_eq!(donations.seen().len(), 1);
    }

    #[tokio::test]
    async fn failures_are_forwarded_to_error_queue() {
        let bus = Arc::new(EventBus::default());
        let emails = Arc::new(Recorder::failing());
        let errors = Arc::new(Recorder::default());

        let mut table = RouteTable::new();
        table.register(Queue::EmailNotification, emails.clone()).unwrap();
        table.register(Queue::Error, errors.clone()).unwrap();
        let handles = table.start(Arc::clone(&bus));

        bus.publish(
            ChurchEvent::new(event_types::EMAIL_NOTIFICATION)
                .with_source("member", 5)
                .with_payload(json!({"to": "a@example.com"})),
        );
        handles.shutdown().await;

        let reported = errors.seen();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].payload["queue"], "email.notification");
        assert_eq!(reported[0].payload["error"], "Email sending failed: boom");
        assert_eq!(reported[0].payload["message"]["to"], "a@example.com");
        assert_eq!(reported[0].source_entity_id, Some(5));
    }

    #[tokio::test]
    async fn error_queue_failures_do_not_loop() {
        let bus = Arc::new(EventBus::default());
        let errors = Arc::new(Recorder::failing());

        let mut table = RouteTable::new();
        table.register(Queue::Error, errors.clone()).unwrap();
        let handles = table.start(Arc::clone(&bus));

        bus.publish(ChurchEvent::new(event_types::ERROR));
        handles.shutdown().await;

        assert_eq!(errors.seen().len(), 1);
    }

    #[tokio::test]
    async fn shutdown_drains_pending_events() {
        let bus = Arc::new(EventBus::default());
        let members = Arc::new(Recorder::default());

        let mut table = RouteTable::new();
        table.register(Queue::MemberCreated, members.clone()).unwrap();
        let handles = table.start(Arc::clone(&bus));
        for _ in 0..5 {
            bus.publish(ChurchEvent::new(event_types::MEMBER_CREATED));
        }

        handles.shutdown().await;
        assert_eq!(members.seen().len(), 5);
    }
}
