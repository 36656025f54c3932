//! Domain event system: progress of the playbook loop.
//!
//! The driver publishes an event at each stage boundary. The CLI (or a test)
//! can subscribe to follow a run without the driver knowing who is watching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// An iteration began
    IterationStarted {
        iteration: usize,
        playbook_size: usize,
        timestamp: DateTime<Utc>,
    },

    /// The generator answered
    AnswerGenerated {
        iteration: usize,
        bullets_used: usize,
        timestamp: DateTime<Utc>,
    },

    /// Reflector tags were applied to the playbook
    BulletsTagged {
        iteration: usize,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Curator additions were merged into the playbook
    BulletsAdded {
        iteration: usize,
        bullet_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// An iteration finished
    IterationCompleted {
        iteration: usize,
        playbook_size: usize,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// An error aborted an iteration
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
