//! Command dispatch: decoded messages to cache mutations, host callbacks,
//! and response writes; plus the outgoing forwarded-event round-trip.

mod pending;

pub use pending::PendingResponses;

use crate::cache::{RenderItem, SharedRenderState};
use crate::error::pipe::PipeError;
use crate::host::HostHooks;
use crate::protocol::{ProtocolMessage, encode_message};
use crate::transport::PipeWriter;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;

/// Everything the worker's dispatch path needs per message.
pub(crate) struct DispatchContext {
    pub cache: SharedRenderState,
    pub hooks: Arc<dyn HostHooks>,
    pub pending: Arc<PendingResponses>,
}

/// Map one decoded controller message to its effect.
///
/// Render commands mutate the cache and trigger a repaint; `Ping` is
/// answered synchronously; `Response` completes the waiting forwarded
/// event. Only write failures propagate - they end the session.
pub(crate) async fn dispatch_message(
    message: ProtocolMessage,
    ctx: &DispatchContext,
    writer: &mut PipeWriter,
) -> Result<(), PipeError> {
    match message {
        ProtocolMessage::SetItem {
            id,
            text,
            x,
            y,
            style,
        } => {
            ctx.cache.apply_set_item(RenderItem {
                id,
                text,
                x,
                y,
                style,
            });
            ctx.hooks.request_repaint();
        }
        ProtocolMessage::RemoveItem { id } => {
            ctx.cache.apply_remove_item(&id);
            ctx.hooks.request_repaint();
        }
        ProtocolMessage::ClearAll => {
            ctx.cache.apply_clear_all();
            ctx.hooks.request_repaint();
        }
        ProtocolMessage::Ping { request_id } => {
            debug!("ping {request_id}");
            writer
                .write_message(&ProtocolMessage::Response {
                    request_id,
                    payload: Bytes::new(),
                })
                .await?;
        }
        ProtocolMessage::Response {
            request_id,
            payload,
        } => {
            ctx.pending.complete(request_id, payload);
        }
        ProtocolMessage::ForwardEvent { request_id, .. } => {
            // Forwarded events only travel panel -> controller.
            warn!("controller sent ForwardEvent {request_id}; ignored");
        }
    }

    Ok(())
}

/// Interpretation of a forwarded-event reply payload: non-zero first byte
/// means the controller handled the event. An empty payload is "unhandled".
pub fn response_indicates_handled(payload: &[u8]) -> bool {
    payload.first().is_some_and(|byte| *byte != 0)
}

/// Host-side sender for the synchronous forward-event round-trip.
///
/// Bridges the host's blocking call onto the worker's asynchronous channel:
/// register a waiter, queue the encoded frame, block with a deadline. The
/// timeout is the system's only cancellation point; expiry falls back to
/// "unhandled" so the host's message pump can never stall indefinitely on
/// an unresponsive controller.
pub struct EventForwarder {
    outgoing_tx: UnboundedSender<Bytes>,
    pending: Arc<PendingResponses>,
    next_request_id: AtomicU64,
}

impl EventForwarder {
    pub(crate) fn new(outgoing_tx: UnboundedSender<Bytes>, pending: Arc<PendingResponses>) -> Self {
        Self {
            outgoing_tx,
            pending,
            // Request id 0 is reserved so a zeroed frame never correlates.
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Offer one host event to the controller and wait for its decision.
    ///
    /// Returns `false` ("unhandled") on timeout, on a stopped worker, or on
    /// a reply that does not claim the event - never an error.
    pub fn forward_event(&self, message_id: u32, param: &[u8], timeout: Duration) -> bool {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let waiter = self.pending.register(request_id);

        let frame = encode_message(&ProtocolMessage::ForwardEvent {
            request_id,
            message_id,
            param: Bytes::copy_from_slice(param),
        });

        if self.outgoing_tx.send(frame).is_err() {
            // Worker already gone; the panel is inert.
            self.pending.cancel(request_id);
            debug!("forward of message {message_id:#06x} dropped: listener stopped");
            return false;
        }

        match waiter.recv_timeout(timeout) {
            Ok(payload) => response_indicates_handled(&payload),
            Err(_) => {
                self.pending.cancel(request_id);
                info!(
                    "no controller response to message {message_id:#06x} within {timeout:?}; \
                     treating as unhandled"
                );
                false
            }
        }
    }
}
