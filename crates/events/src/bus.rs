//! In-process event bus over a `tokio::sync::broadcast` channel.
//!
//! Shared as `Arc<EventBus>` between the API, the orchestrator and the
//! background subscribers.

use adapt_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// Something that happened to a run or a review task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated name, see [`crate::event_types`].
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// Reviewer or worker identity that caused the event.
    pub actor: Option<String>,
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
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

const DEFAULT_CAPACITY: usize = 1024;

pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        tracing::debug!(event_type = %event.event_type, entity_id = ?event.source_entity_id, "Publishing event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_types;

    #[test]
    fn builder_sets_optional_fields() {
        let event = PlatformEvent::new(event_types::HITL_TASK_APPROVED)
            .with_source(event_types::ENTITY_HITL_TASK, 7)
            .with_actor("reviewer@example.com")
            .with_payload(serde_json::json!({ "run_key": "run-1" }));

        assert_eq!(event.event_type, "hitl.task_approved");
        assert_eq!(event.source_entity_type.as_deref(), Some("hitl_task"));
        assert_eq!(event.source_entity_id, Some(7));
        assert_eq!(event.actor.as_deref(), Some("reviewer@example.com"));
        assert_eq!(event.payload["run_key"], "run-1");
    }

    #[test]
    fn new_event_has_empty_object_payload() {
        let event = PlatformEvent::new(event_types::RUN_CREATED);
        assert!(event.payload.as_object().is_some_and(|o| o.is_empty()));
        assert!(event.actor.is_none());
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(PlatformEvent::new(event_types::RUN_COMPLETED).with_source("pipeline_run", 1));

        assert_eq!(first.recv().await.unwrap().event_type, "run.completed");
        assert_eq!(second.recv().await.unwrap().source_entity_id, Some(1));
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.publish(PlatformEvent::new(event_types::RUN_FAILED));
    }
}
