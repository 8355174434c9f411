//! Send-then-wait-once request/reply bridging.
//!
//! `request_reply` arms a one-shot listener for the expected reply, then
//! dispatches the outbound payload, then waits. The listener and the
//! deadline are both armed when the operation starts, not when the caller
//! first polls the wait, so a reply emitted immediately on delivery cannot
//! be lost and a zero timeout still loses to a reply that was already
//! scheduled. Settlement is single-writer: the first matching frame takes
//! the reply sender out of its slot, so a later match and the deadline both
//! find it gone.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use corelay_types::error::LinkError;
use corelay_types::filter::Filter;
use corelay_types::id::EntityId;
use corelay_types::message::EventFrame;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

use super::correlator::{Correlator, ListenerGuard};
use super::dispatcher::Dispatcher;

/// Composes dispatch and correlation into one request/reply operation.
#[derive(Clone)]
pub struct RequestBridge {
    dispatcher: Dispatcher,
    correlator: Correlator,
    default_timeout: Duration,
}

impl RequestBridge {
    /// Create a bridge with the given default wait.
    pub fn new(dispatcher: Dispatcher, correlator: Correlator, default_timeout: Duration) -> Self {
        Self {
            dispatcher,
            correlator,
            default_timeout,
        }
    }

    /// Send `payload` to `recipient` and wait for the first frame on its
    /// event stream that matches `filter`.
    ///
    /// When `timeout` is `None` the bridge's configured default applies.
    /// On timeout the reply listener is deregistered and the call fails
    /// with [`LinkError::RequestTimeout`]. A recipient that resolves but
    /// is torn down mid-wait does not fail the wait early; only a matching
    /// frame or the deadline settles it.
    ///
    /// Resolution failure on the listening side fails immediately, before
    /// any deadline is armed or payload sent.
    pub fn request_reply(
        &self,
        recipient: &EntityId,
        payload: Value,
        filter: Filter,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<EventFrame, LinkError>> + Send + use<> {
        let wait = timeout.unwrap_or(self.default_timeout);
        let deadline = Instant::now() + wait;
        let armed = self.arm(recipient, payload, filter);

        async move {
            let (reply_rx, guard) = armed?;
            let reply = async {
                match reply_rx.await {
                    Ok(frame) => frame,
                    // Reply slot gone without a frame (entity torn down
                    // mid-wait). The wait belongs to the deadline.
                    Err(_) => std::future::pending().await,
                }
            };
            match tokio::time::timeout_at(deadline, reply).await {
                Ok(frame) => Ok(frame),
                Err(_) => {
                    guard.cancel();
                    debug!(waited_ms = wait.as_millis() as u64, "request timed out");
                    Err(LinkError::RequestTimeout(wait))
                }
            }
        }
    }

    /// Register the one-shot reply listener, then dispatch the payload.
    ///
    /// Runs synchronously at call time so the listener is in place before
    /// the send and before the caller ever polls the returned future.
    fn arm(
        &self,
        recipient: &EntityId,
        payload: Value,
        filter: Filter,
    ) -> Result<(oneshot::Receiver<EventFrame>, ListenerGuard), LinkError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        // take() is the settlement: only the first matching frame finds the
        // sender, every later one finds the slot empty.
        let slot = Arc::new(Mutex::new(Some(reply_tx)));
        let guard = self.correlator.listen(
            recipient,
            filter,
            move |frame| {
                if let Some(tx) = slot.lock().ok().and_then(|mut pending| pending.take()) {
                    let _ = tx.send(frame);
                }
            },
            true,
        )?;
        self.dispatcher.send(recipient, payload);
        Ok((reply_rx, guard))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
