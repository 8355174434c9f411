//! Fire-and-forget dispatch to an entity's inbound handler.
//!
//! `send` resolves the recipient, then hands the payload to a spawned task
//! so delivery never runs inside the caller's stack frame. A caller that
//! sends and immediately registers a listener therefore cannot race its own
//! delivery, and a failing handler cannot unwind into the caller.

use std::sync::Arc;

use corelay_types::id::{EntityId, SessionId};
use serde_json::Value;
use tracing::error;

use crate::entity::EntityLookup;

/// Sends messages to entities on behalf of one caller session.
#[derive(Clone)]
pub struct Dispatcher {
    lookup: Arc<dyn EntityLookup>,
    session: SessionId,
}

impl Dispatcher {
    /// Create a dispatcher bound to a caller session.
    pub fn new(lookup: Arc<dyn EntityLookup>, session: SessionId) -> Self {
        Self { lookup, session }
    }

    /// Send a payload to the named entity, fire-and-forget.
    ///
    /// Lookup failures are absorbed: an unknown recipient or a handle
    /// without inbound capability produces a logged error and no delivery.
    /// The recipient is re-resolved on every call; handles are never held
    /// across operations.
    pub fn send(&self, recipient: &EntityId, payload: Value) {
        let Some(handle) = self.lookup.resolve(recipient) else {
            error!(recipient = %recipient, "no connected entity for send");
            return;
        };
        let Some(inbound) = handle.inbound() else {
            error!(recipient = %recipient, "entity has no inbound capability");
            return;
        };

        let origin = self.session.clone();
        let recipient = recipient.clone();
        tokio::spawn(async move {
            if let Err(e) = inbound.deliver(&origin, payload) {
                error!(recipient = %recipient, error = %e, "inbound delivery failed");
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
