//! Pass-through to the external event publish collaborator.
//!
//! The relay does not own a pub/sub system. `PublishBridge` hands events to
//! whatever publisher was injected at construction and reports only whether
//! the handoff was possible; failures after handoff are logged, never
//! surfaced.

use std::sync::Arc;

use corelay_types::error::PublishError;
use corelay_types::event::PublishedEvent;
use tracing::error;

/// External publish/subscribe collaborator consumed by the relay.
pub trait EventPublisher: Send + Sync {
    /// Publish one event to subscribers.
    fn publish(&self, event: &PublishedEvent) -> Result<(), PublishError>;
}

/// Hands events to the publish collaborator without exposing its failures.
#[derive(Clone)]
pub struct PublishBridge {
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl PublishBridge {
    /// Create a bridge over an optional publish collaborator.
    pub fn new(publisher: Option<Arc<dyn EventPublisher>>) -> Self {
        Self { publisher }
    }

    /// Queue `event` for publishing.
    ///
    /// Returns `false` when no collaborator is configured (logged). Returns
    /// `true` as soon as the event is handed off; a rejection after handoff
    /// is logged and dropped.
    pub fn publish(&self, event: PublishedEvent) -> bool {
        let Some(publisher) = self.publisher.clone() else {
            error!(event = %event.name, "event publisher unavailable");
            return false;
        };
        tokio::spawn(async move {
            if let Err(e) = publisher.publish(&event) {
                error!(event = %event.name, error = %e, "event publish failed");
            }
        });
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
