//! Connection lifecycle tracking for the listener worker.

use log::debug;

/// States of the transient controller connection.
///
/// Owned exclusively by the listener worker; the rest of the system only
/// ever sees the worker's effects (cache mutations, repaint requests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
    Closed,
}

/// Tracks the worker's connection state and logs transitions.
pub(crate) struct ConnectionTracker {
    state: ConnectionState,
}

impl ConnectionTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
        }
    }

    pub(crate) fn advance(&mut self, next: ConnectionState) {
        if self.state != next {
            debug!("connection {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }
}
