//! Request-id correlation for forwarded-event replies.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};

use bytes::Bytes;
use log::{debug, warn};

/// In-flight forwarded events awaiting a `Response`.
///
/// Each waiter is a rendezvous slot keyed by request id. Completion from
/// the worker and timeout-cancellation from the host may race; whichever
/// removes the slot first wins, and a reply that finds no slot is a late
/// response to an already-expired wait - logged and dropped so it can
/// never satisfy a later request.
#[derive(Default)]
pub struct PendingResponses {
    slots: Mutex<HashMap<u64, SyncSender<Bytes>>>,
}

impl PendingResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the waiter slot for a fresh request id.
    pub(crate) fn register(&self, request_id: u64) -> Receiver<Bytes> {
        let (tx, rx) = sync_channel(1);
        self.lock().insert(request_id, tx);
        rx
    }

    /// Deliver a reply to its waiter, if it is still waiting.
    pub(crate) fn complete(&self, request_id: u64, payload: Bytes) {
        match self.lock().remove(&request_id) {
            Some(slot) => {
                if slot.send(payload).is_err() {
                    debug!("waiter for request {request_id} gave up before delivery");
                }
            }
            None => warn!("late or unknown response for request {request_id}; dropped"),
        }
    }

    /// Forget a waiter after timeout or send failure.
    pub(crate) fn cancel(&self, request_id: u64) {
        self.lock().remove(&request_id);
    }

    /// Drop every slot so blocked waiters return immediately. Called when
    /// the worker exits; a disconnected slot reads as "unhandled".
    pub(crate) fn abort_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, SyncSender<Bytes>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
