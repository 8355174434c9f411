//! Per-caller facade over the link primitives.
//!
//! A `LinkSession` binds one caller's session identifier to the shared
//! entity lookup and publish collaborator. One API connection holds one
//! session handle for its lifetime; everything the connection does with
//! entities goes through it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use corelay_types::config::LinkConfig;
use corelay_types::error::LinkError;
use corelay_types::event::PublishedEvent;
use corelay_types::filter::Filter;
use corelay_types::id::{EntityId, SessionId};
use corelay_types::message::EventFrame;
use serde_json::Value;

use crate::entity::EntityLookup;
use crate::publish::{EventPublisher, PublishBridge};

use super::bridge::RequestBridge;
use super::correlator::{Correlator, ListenerGuard};
use super::dispatcher::Dispatcher;

/// Relay operations bound to a single caller session.
#[derive(Clone)]
pub struct LinkSession {
    dispatcher: Dispatcher,
    correlator: Correlator,
    bridge: RequestBridge,
    publisher: PublishBridge,
    session: SessionId,
}

impl LinkSession {
    /// Create a session handle over the given lookup and publish
    /// collaborator.
    pub fn new(
        lookup: Arc<dyn EntityLookup>,
        publisher: Option<Arc<dyn EventPublisher>>,
        config: &LinkConfig,
        session: SessionId,
    ) -> Self {
        let dispatcher = Dispatcher::new(lookup.clone(), session.clone());
        let correlator = Correlator::new(lookup, session.clone());
        let bridge = RequestBridge::new(
            dispatcher.clone(),
            correlator.clone(),
            config.request_timeout(),
        );
        Self {
            dispatcher,
            correlator,
            bridge,
            publisher: PublishBridge::new(publisher),
            session,
        }
    }

    /// Identifier of the caller session this handle is bound to.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Fire-and-forget send. See [`Dispatcher::send`].
    pub fn send(&self, recipient: &EntityId, payload: Value) {
        self.dispatcher.send(recipient, payload);
    }

    /// Register a filtered listener. See [`Correlator::listen`].
    pub fn listen<F>(
        &self,
        recipient: &EntityId,
        filter: Filter,
        callback: F,
        once: bool,
    ) -> Result<ListenerGuard, LinkError>
    where
        F: Fn(EventFrame) + Send + Sync + 'static,
    {
        self.correlator.listen(recipient, filter, callback, once)
    }

    /// Register a listener for the expected reply, then fire `payload`.
    ///
    /// The listener is armed before the send, so a reply emitted
    /// immediately on delivery cannot slip past it. The send itself stays
    /// fire-and-forget; the returned guard controls the listener.
    pub fn send_and_listen<F>(
        &self,
        recipient: &EntityId,
        payload: Value,
        filter: Filter,
        callback: F,
        once: bool,
    ) -> Result<ListenerGuard, LinkError>
    where
        F: Fn(EventFrame) + Send + Sync + 'static,
    {
        let guard = self.correlator.listen(recipient, filter, callback, once)?;
        self.dispatcher.send(recipient, payload);
        Ok(guard)
    }

    /// Send and wait for the first matching reply. See
    /// [`RequestBridge::request_reply`].
    pub fn request_reply(
        &self,
        recipient: &EntityId,
        payload: Value,
        filter: Filter,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<EventFrame, LinkError>> + Send + use<> {
        self.bridge.request_reply(recipient, payload, filter, timeout)
    }

    /// Hand an event to the external publish collaborator. See
    /// [`PublishBridge::publish`].
    pub fn publish_event(&self, event: PublishedEvent) -> bool {
        self.publisher.publish(event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
