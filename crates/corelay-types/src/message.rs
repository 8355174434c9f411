//! Message frames crossing the relay boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{EntityId, SessionId};

/// A message delivered from a caller session to an entity's inbound handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Session that originated the message.
    pub origin: SessionId,
    /// Freeform JSON payload.
    pub payload: Value,
}

impl InboundMessage {
    pub fn new(origin: SessionId, payload: Value) -> Self {
        Self { origin, payload }
    }
}

/// A frame heard on an entity's outbound event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    /// Entity the frame came from.
    pub sender: EntityId,
    /// Freeform JSON payload.
    pub payload: Value,
}

impl EventFrame {
    pub fn new(sender: EntityId, payload: Value) -> Self {
        Self { sender, payload }
    }
}
