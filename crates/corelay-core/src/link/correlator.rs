//! Filtered listeners over entity event streams.
//!
//! `listen` registers a wrapped handler on the recipient's event stream,
//! keyed by the caller's session. The wrapper evaluates the structural
//! filter on every frame; non-matching frames leave the listener armed.
//! A one-shot listener disarms and deregisters itself before its callback
//! is scheduled, so two matching frames arriving back-to-back fire it
//! exactly once. Frames may be dispatched from any runtime worker, so the
//! disarm is an atomic swap rather than a flag check.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use corelay_types::error::{Capability, LinkError};
use corelay_types::filter::Filter;
use corelay_types::id::{EntityId, SessionId};
use corelay_types::message::EventFrame;
use tracing::{debug, error};

use crate::entity::{EntityLookup, EventHandler, EventSource, SubscriptionToken};

/// Registers filtered listeners on behalf of one caller session.
#[derive(Clone)]
pub struct Correlator {
    lookup: Arc<dyn EntityLookup>,
    session: SessionId,
}

/// Handle to a registered listener, usable to deregister it early.
///
/// Dropping the guard leaves the listener in place: standing listeners
/// outlive the scope that registered them until `cancel` is called or the
/// entity is torn down. One-shot listeners deregister themselves.
pub struct ListenerGuard {
    source: Arc<dyn EventSource>,
    session: SessionId,
    token: SubscriptionToken,
}

impl ListenerGuard {
    /// Remove the listener from the entity's event stream.
    ///
    /// Cancelling a listener that already deregistered itself is a no-op.
    pub fn cancel(self) {
        self.source.unsubscribe(&self.session, self.token);
    }
}

impl Correlator {
    /// Create a correlator bound to a caller session.
    pub fn new(lookup: Arc<dyn EntityLookup>, session: SessionId) -> Self {
        Self { lookup, session }
    }

    /// Listen for frames on `recipient`'s event stream that match `filter`.
    ///
    /// The callback always runs on its own spawned task, never inline in
    /// the event-delivery path, and a panicking callback is caught and
    /// logged. With `once` set the listener deregisters before its first
    /// callback is scheduled; otherwise it stays armed for every match
    /// until [`ListenerGuard::cancel`].
    ///
    /// Unlike `send`, an unknown recipient or a handle without an event
    /// stream is an error here: there is nothing to arm.
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
        let Some(handle) = self.lookup.resolve(recipient) else {
            error!(recipient = %recipient, "no connected entity for listen");
            return Err(LinkError::RecipientNotFound(recipient.clone()));
        };
        let Some(source) = handle.events() else {
            error!(recipient = %recipient, "entity has no event stream capability");
            return Err(LinkError::CapabilityMissing {
                id: recipient.clone(),
                capability: Capability::Events,
            });
        };

        let callback = Arc::new(callback);
        let armed = Arc::new(AtomicBool::new(true));
        let token_slot: Arc<OnceLock<SubscriptionToken>> = Arc::new(OnceLock::new());

        let wrapped: EventHandler = {
            let source = source.clone();
            let session = self.session.clone();
            let armed = armed.clone();
            let token_slot = token_slot.clone();
            Arc::new(move |frame: EventFrame| {
                if !filter.matches(&frame.payload) {
                    return;
                }
                if once {
                    // Single winner: the first matching frame flips the flag,
                    // every later match sees it down and stops here.
                    if !armed.swap(false, Ordering::SeqCst) {
                        return;
                    }
                    // Deregister before the callback is scheduled.
                    if let Some(token) = token_slot.get() {
                        source.unsubscribe(&session, *token);
                    }
                }
                let callback = callback.clone();
                tokio::spawn(async move {
                    if catch_unwind(AssertUnwindSafe(|| callback(frame))).is_err() {
                        error!("listener callback panicked");
                    }
                });
            })
        };

        let token = source.subscribe(&self.session, wrapped);
        let _ = token_slot.set(token);
        if once && !armed.load(Ordering::SeqCst) {
            // A match landed before the token was published; finish the
            // deregistration the wrapper could not perform.
            source.unsubscribe(&self.session, token);
        }
        debug!(recipient = %recipient, once, "listener registered");

        Ok(ListenerGuard {
            source,
            session: self.session.clone(),
            token,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
