//! Entity lookup and capability ports.
//!
//! These traits are the boundary to the transport layer that owns live
//! entity connections. The relay resolves a recipient on every operation
//! (handles may go stale between calls) and consumes at most three
//! capabilities from a resolved handle: inbound delivery, event-stream
//! subscribe, and event-stream unsubscribe.

use std::sync::Arc;

use corelay_types::id::{EntityId, SessionId};
use corelay_types::message::EventFrame;
use serde_json::Value;

/// Boxed error returned by an entity's inbound handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Callback invoked for every frame on an entity's event stream.
pub type EventHandler = Arc<dyn Fn(EventFrame) + Send + Sync>;

/// Token identifying one registered event handler, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(pub u64);

/// Query-only resolution from identifier to live entity handle.
///
/// Implementations must be side-effect-free: resolving never creates,
/// connects, or tears down an entity.
pub trait EntityLookup: Send + Sync {
    /// Resolve an identifier to a live handle, or `None` when no such
    /// entity is connected.
    fn resolve(&self, id: &EntityId) -> Option<Arc<dyn EntityHandle>>;
}

/// A live connected entity, exposing whichever capabilities its transport
/// supports.
///
/// A capability may be absent (a receive-only or emit-only connection);
/// each relay operation checks the capability it needs and treats absence
/// the same way it treats an unknown recipient.
pub trait EntityHandle: Send + Sync {
    /// Inbound delivery capability, or `None` when the connection cannot
    /// accept messages.
    fn inbound(&self) -> Option<Arc<dyn InboundHandler>>;

    /// Outbound event stream capability, or `None` when the connection
    /// does not emit events.
    fn events(&self) -> Option<Arc<dyn EventSource>>;
}

/// Inbound delivery capability of an entity.
pub trait InboundHandler: Send + Sync {
    /// Hand a payload from the given session to the entity.
    fn deliver(&self, origin: &SessionId, payload: Value) -> Result<(), HandlerError>;
}

/// Outbound event stream capability of an entity.
///
/// Handlers are keyed by caller session, so independent callers register
/// and remove listeners without interfering with one another. Implementors
/// must tolerate a handler unsubscribing itself while a frame is being
/// dispatched, and removing a token twice must be a no-op.
pub trait EventSource: Send + Sync {
    /// Register a handler for every future frame, returning a token for
    /// removal.
    fn subscribe(&self, key: &SessionId, handler: EventHandler) -> SubscriptionToken;

    /// Remove a previously registered handler.
    fn unsubscribe(&self, key: &SessionId, token: SubscriptionToken);
}
