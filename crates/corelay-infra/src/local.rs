//! Channel-backed entity handles for in-process use.
//!
//! A `LocalEntity` gives its owner a bounded inbound mailbox and a handler
//! table for its outbound event stream. The registry hands these out as
//! `EntityHandle`s; the owning task consumes the mailbox and calls `emit`
//! to push frames to every listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use corelay_core::entity::{
    EntityHandle, EventHandler, EventSource, HandlerError, InboundHandler, SubscriptionToken,
};
use corelay_types::id::{EntityId, SessionId};
use corelay_types::message::{EventFrame, InboundMessage};
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

/// Buffer size for per-entity inbound mailboxes (mpsc).
const INBOUND_BUFFER: usize = 256;

/// An entity connected within this process.
pub struct LocalEntity {
    id: EntityId,
    mailbox: Arc<Mailbox>,
    events: Arc<HandlerTable>,
}

struct Mailbox {
    tx: mpsc::Sender<InboundMessage>,
}

struct HandlerTable {
    /// Registered handlers, keyed by (session, token).
    handlers: DashMap<(SessionId, u64), EventHandler>,
    next_token: AtomicU64,
}

impl LocalEntity {
    /// Create a local entity and the receiving end of its mailbox.
    pub fn new(id: EntityId) -> (Arc<Self>, mpsc::Receiver<InboundMessage>) {
        Self::with_capacity(id, INBOUND_BUFFER)
    }

    /// Create a local entity with an explicit mailbox capacity.
    pub fn with_capacity(
        id: EntityId,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<InboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let entity = Arc::new(Self {
            id,
            mailbox: Arc::new(Mailbox { tx }),
            events: Arc::new(HandlerTable {
                handlers: DashMap::new(),
                next_token: AtomicU64::new(0),
            }),
        });
        (entity, rx)
    }

    /// Identifier this entity is registered under.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Push a frame to every listener on this entity's event stream.
    pub fn emit(&self, payload: Value) {
        self.events.dispatch(EventFrame::new(self.id.clone(), payload));
    }

    /// Number of listeners currently registered across all sessions.
    pub fn listener_count(&self) -> usize {
        self.events.handlers.len()
    }
}

impl std::fmt::Debug for LocalEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEntity")
            .field("id", &self.id)
            .field("listeners", &self.events.handlers.len())
            .finish()
    }
}

impl EntityHandle for LocalEntity {
    fn inbound(&self) -> Option<Arc<dyn InboundHandler>> {
        Some(self.mailbox.clone())
    }

    fn events(&self) -> Option<Arc<dyn EventSource>> {
        Some(self.events.clone())
    }
}

impl InboundHandler for Mailbox {
    fn deliver(&self, origin: &SessionId, payload: Value) -> Result<(), HandlerError> {
        self.tx
            .try_send(InboundMessage::new(origin.clone(), payload))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => "mailbox full".into(),
                mpsc::error::TrySendError::Closed(_) => "mailbox closed".into(),
            })
    }
}

impl HandlerTable {
    fn dispatch(&self, frame: EventFrame) {
        // Snapshot first: a handler may unsubscribe itself mid-dispatch,
        // which would otherwise mutate the map while it is being iterated.
        let snapshot: Vec<EventHandler> = self
            .handlers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for handler in snapshot {
            handler(frame.clone());
        }
    }
}

impl EventSource for HandlerTable {
    fn subscribe(&self, key: &SessionId, handler: EventHandler) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.handlers.insert((key.clone(), token.0), handler);
        debug!(session = %key, token = token.0, "event listener subscribed");
        token
    }

    fn unsubscribe(&self, key: &SessionId, token: SubscriptionToken) {
        self.handlers.remove(&(key.clone(), token.0));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
