//! Review event types and EventBus
//!
//! Every state change of the review session is published as a
//! [`ReviewEvent`] so that SSE clients can follow along.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::rating::{ItemId, Rating};
use crate::session::Summary;

/// Review event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReviewEvent {
    /// Evaluator produced the items for a fresh session
    EvaluationCompleted {
        session_id: Uuid,
        evaluator: String,
        item_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Reviewer agreed or disagreed with an AI rating
    FeedbackRecorded {
        session_id: Uuid,
        item_id: ItemId,
        agree: bool,
        /// Set when agreeing removed a previously given override
        override_cleared: bool,
        timestamp: DateTime<Utc>,
    },

    /// Reviewer supplied an override rating
    OverrideRecorded {
        session_id: Uuid,
        item_id: ItemId,
        rating: Rating,
        timestamp: DateTime<Utc>,
    },

    /// Session submitted and summary computed
    Submitted {
        session_id: Uuid,
        summary: Summary,
        timestamp: DateTime<Utc>,
    },

    /// Feedback, overrides and summary cleared
    SessionReset {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl ReviewEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            ReviewEvent::EvaluationCompleted { .. } => "EvaluationCompleted",
            ReviewEvent::FeedbackRecorded { .. } => "FeedbackRecorded",
            ReviewEvent::OverrideRecorded { .. } => "OverrideRecorded",
            ReviewEvent::Submitted { .. } => "Submitted",
            ReviewEvent::SessionReset { .. } => "SessionReset",
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            ReviewEvent::EvaluationCompleted { session_id, .. }
            | ReviewEvent::FeedbackRecorded { session_id, .. }
            | ReviewEvent::OverrideRecorded { session_id, .. }
            | ReviewEvent::Submitted { session_id, .. }
            | ReviewEvent::SessionReset { session_id, .. } => *session_id,
        }
    }
}

/// Central event distribution bus
///
/// Wraps a tokio broadcast channel: publishing never blocks, slow
/// subscribers observe `Lagged` and skip ahead.
///
/// # Examples
///
/// ```
/// use aiev_common::events::{EventBus, ReviewEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(ReviewEvent::SessionReset {
///     session_id: uuid::Uuid::new_v4(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReviewEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if no subscriber is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ReviewEvent,
    ) -> Result<usize, broadcast::error::SendError<ReviewEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ReviewEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
