//! In-memory stub entities and lookups for exercising the link primitives
//! without `corelay-infra`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use corelay_types::id::{EntityId, SessionId};
use corelay_types::message::{EventFrame, InboundMessage};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::entity::{
    EntityHandle, EntityLookup, EventHandler, EventSource, HandlerError, InboundHandler,
    SubscriptionToken,
};

/// Stub entity with an unbounded inbound mailbox and a live handler table.
pub(crate) struct StubEntity {
    id: EntityId,
    mailbox: Arc<StubMailbox>,
    events: Arc<StubEvents>,
}

pub(crate) struct StubMailbox {
    tx: mpsc::UnboundedSender<InboundMessage>,
    fail: bool,
}

#[derive(Default)]
pub(crate) struct StubEvents {
    handlers: Mutex<HashMap<(SessionId, u64), EventHandler>>,
    next_token: AtomicU64,
}

impl StubEntity {
    pub(crate) fn new(id: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<InboundMessage>) {
        Self::build(id, false)
    }

    /// Stub whose inbound handler rejects every delivery.
    pub(crate) fn failing(id: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<InboundMessage>) {
        Self::build(id, true)
    }

    fn build(id: &str, fail: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<InboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let entity = Arc::new(Self {
            id: EntityId::from(id),
            mailbox: Arc::new(StubMailbox { tx, fail }),
            events: Arc::new(StubEvents::default()),
        });
        (entity, rx)
    }

    /// Push a frame to every registered handler, as the entity's transport
    /// would on an outbound event.
    pub(crate) fn emit(&self, payload: Value) {
        self.events
            .dispatch(EventFrame::new(self.id.clone(), payload));
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.events.handlers.lock().unwrap().len()
    }
}

impl EntityHandle for StubEntity {
    fn inbound(&self) -> Option<Arc<dyn InboundHandler>> {
        Some(self.mailbox.clone())
    }

    fn events(&self) -> Option<Arc<dyn EventSource>> {
        Some(self.events.clone())
    }
}

impl InboundHandler for StubMailbox {
    fn deliver(&self, origin: &SessionId, payload: Value) -> Result<(), HandlerError> {
        if self.fail {
            return Err("inbound handler rejected the payload".into());
        }
        self.tx
            .send(InboundMessage::new(origin.clone(), payload))
            .map_err(|_| "stub mailbox closed".into())
    }
}

impl StubEvents {
    fn dispatch(&self, frame: EventFrame) {
        // Snapshot first: a handler may unsubscribe itself mid-dispatch.
        let snapshot: Vec<EventHandler> = self.handlers.lock().unwrap().values().cloned().collect();
        for handler in snapshot {
            handler(frame.clone());
        }
    }
}

impl EventSource for StubEvents {
    fn subscribe(&self, key: &SessionId, handler: EventHandler) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.handlers
            .lock()
            .unwrap()
            .insert((key.clone(), token.0), handler);
        token
    }

    fn unsubscribe(&self, key: &SessionId, token: SubscriptionToken) {
        self.handlers.lock().unwrap().remove(&(key.clone(), token.0));
    }
}

/// Entity handle that reports no capabilities at all.
pub(crate) struct InertEntity;

impl EntityHandle for InertEntity {
    fn inbound(&self) -> Option<Arc<dyn InboundHandler>> {
        None
    }

    fn events(&self) -> Option<Arc<dyn EventSource>> {
        None
    }
}

/// Lookup over a fixed table of entity handles.
#[derive(Default)]
pub(crate) struct StaticLookup {
    entities: Mutex<HashMap<EntityId, Arc<dyn EntityHandle>>>,
}

impl StaticLookup {
    pub(crate) fn insert(&self, id: &str, handle: Arc<dyn EntityHandle>) {
        self.entities
            .lock()
            .unwrap()
            .insert(EntityId::from(id), handle);
    }
}

impl EntityLookup for StaticLookup {
    fn resolve(&self, id: &EntityId) -> Option<Arc<dyn EntityHandle>> {
        self.entities.lock().unwrap().get(id).cloned()
    }
}
