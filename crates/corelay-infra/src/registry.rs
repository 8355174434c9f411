//! Identifier-to-entity registry for in-process entities.
//!
//! The `LinkRegistry` is the [`EntityLookup`] implementation the relay core
//! resolves recipients against. Registering an identifier creates a
//! [`LocalEntity`] and returns its mailbox receiver; resolving hands out
//! the live handle.

use std::sync::Arc;

use corelay_core::entity::{EntityHandle, EntityLookup};
use corelay_types::id::EntityId;
use corelay_types::message::InboundMessage;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use crate::local::LocalEntity;

/// Registry of entities connected within this process.
#[derive(Default)]
pub struct LinkRegistry {
    entities: DashMap<EntityId, Arc<LocalEntity>>,
}

impl LinkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
        }
    }

    /// Register an entity and return it with the receiving end of its
    /// mailbox.
    ///
    /// If the identifier is already registered, the previous entity is
    /// replaced and its mailbox closes.
    pub fn register(&self, id: EntityId) -> (Arc<LocalEntity>, mpsc::Receiver<InboundMessage>) {
        let (entity, rx) = LocalEntity::new(id.clone());
        self.entities.insert(id.clone(), entity.clone());
        debug!(entity = %id, "entity registered");
        (entity, rx)
    }

    /// Remove an entity, dropping its handle.
    ///
    /// Returns `true` if the entity was registered.
    pub fn unregister(&self, id: &EntityId) -> bool {
        let removed = self.entities.remove(id).is_some();
        if removed {
            debug!(entity = %id, "entity unregistered");
        }
        removed
    }

    /// Check if an identifier currently resolves.
    pub fn is_registered(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityLookup for LinkRegistry {
    fn resolve(&self, id: &EntityId) -> Option<Arc<dyn EntityHandle>> {
        self.entities
            .get(id)
            .map(|entry| entry.value().clone() as Arc<dyn EntityHandle>)
    }
}

impl std::fmt::Debug for LinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkRegistry")
            .field("registered_entities", &self.entities.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use corelay_core::link::LinkSession;
    use corelay_types::config::LinkConfig;
    use corelay_types::error::LinkError;
    use corelay_types::filter::Filter;
    use corelay_types::id::SessionId;
    use serde_json::json;
    use std::time::Duration;

    fn make_session(registry: &Arc<LinkRegistry>) -> LinkSession {
        LinkSession::new(
            registry.clone(),
            None,
            &LinkConfig::default(),
            SessionId::new(),
        )
    }

    #[tokio::test]
    async fn register_resolve_unregister() {
        let registry = LinkRegistry::new();
        let id = EntityId::from("core-1");

        assert!(registry.resolve(&id).is_none());
        let (_entity, _rx) = registry.register(id.clone());
        assert!(registry.is_registered(&id));
        assert!(registry.resolve(&id).is_some());
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister(&id));
        assert!(!registry.is_registered(&id));
        assert!(registry.resolve(&id).is_none());
        assert!(!registry.unregister(&id));
    }

    #[tokio::test]
    async fn reregistering_replaces_the_entity() {
        let registry = LinkRegistry::new();
        let id = EntityId::from("core-1");

        let (old, mut old_rx) = registry.register(id.clone());
        let (_new, _new_rx) = registry.register(id.clone());
        assert_eq!(registry.len(), 1);

        // The registry dropped the old entity; once the last handle goes,
        // its mailbox closes.
        drop(old);
        assert!(old_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn ping_pong_round_trip_through_the_relay() {
        let registry = Arc::new(LinkRegistry::new());
        let id = EntityId::from("core-1");
        let (entity, mut inbox) = registry.register(id.clone());

        tokio::spawn(async move {
            while let Some(message) = inbox.recv().await {
                if message.payload["cmd"] == "ping" {
                    entity.emit(json!({"cmd": "pong", "seq": message.payload["seq"]}));
                }
            }
        });

        let session = make_session(&registry);
        let frame = session
            .request_reply(
                &id,
                json!({"cmd": "ping", "seq": 42}),
                Filter::try_from(json!({"cmd": "pong"})).unwrap(),
                Some(Duration::from_millis(500)),
            )
            .await
            .unwrap();

        assert_eq!(frame.sender, id);
        assert_eq!(frame.payload["seq"], 42);
    }

    #[tokio::test]
    async fn request_to_silent_entity_times_out() {
        let registry = Arc::new(LinkRegistry::new());
        let id = EntityId::from("core-1");
        let (entity, _inbox) = registry.register(id.clone());

        let session = make_session(&registry);
        let result = session
            .request_reply(
                &id,
                json!({"cmd": "ping"}),
                Filter::try_from(json!({"cmd": "pong"})).unwrap(),
                Some(Duration::from_millis(40)),
            )
            .await;

        assert!(matches!(result, Err(LinkError::RequestTimeout(_))));
        assert_eq!(entity.listener_count(), 0);
    }

    #[tokio::test]
    async fn request_to_unknown_entity_fails_immediately() {
        let registry = Arc::new(LinkRegistry::new());
        let session = make_session(&registry);

        let result = session
            .request_reply(
                &EntityId::from("ghost"),
                json!({"cmd": "ping"}),
                Filter::empty(),
                Some(Duration::from_secs(30)),
            )
            .await;

        assert!(matches!(result, Err(LinkError::RecipientNotFound(_))));
    }

    #[tokio::test]
    async fn standing_listener_survives_across_requests() {
        let registry = Arc::new(LinkRegistry::new());
        let id = EntityId::from("core-1");
        let (entity, _inbox) = registry.register(id.clone());

        let session = make_session(&registry);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let guard = session
            .listen(
                &id,
                Filter::try_from(json!({"kind": "telemetry"})).unwrap(),
                move |frame| drop(tx.send(frame)),
                false,
            )
            .unwrap();

        entity.emit(json!({"kind": "telemetry", "reading": 1}));
        entity.emit(json!({"kind": "other"}));
        entity.emit(json!({"kind": "telemetry", "reading": 2}));

        assert_eq!(rx.recv().await.unwrap().payload["reading"], 1);
        assert_eq!(rx.recv().await.unwrap().payload["reading"], 2);

        guard.cancel();
        assert_eq!(entity.listener_count(), 0);
    }

    #[tokio::test]
    async fn sessions_do_not_share_listeners() {
        let registry = Arc::new(LinkRegistry::new());
        let id = EntityId::from("core-1");
        let (entity, _inbox) = registry.register(id.clone());

        let session_a = make_session(&registry);
        let session_b = make_session(&registry);

        let (tx_a, mut rx_a) = tokio::sync::mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = tokio::sync::mpsc::unbounded_channel();
        let guard_a = session_a
            .listen(&id, Filter::empty(), move |f| drop(tx_a.send(f)), false)
            .unwrap();
        let _guard_b = session_b
            .listen(&id, Filter::empty(), move |f| drop(tx_b.send(f)), false)
            .unwrap();
        assert_eq!(entity.listener_count(), 2);

        // Cancelling one session's listener leaves the other armed.
        guard_a.cancel();
        assert_eq!(entity.listener_count(), 1);

        entity.emit(json!({"seq": 1}));
        assert!(rx_b.recv().await.is_some());
        assert!(
            tokio::time::timeout(Duration::from_millis(20), rx_a.recv())
                .await
                .is_err()
        );
    }

    #[test]
    fn debug_impl() {
        let registry = LinkRegistry::new();
        let debug = format!("{registry:?}");
        assert!(debug.contains("LinkRegistry"));
        assert!(debug.contains("registered_entities"));
    }
}
