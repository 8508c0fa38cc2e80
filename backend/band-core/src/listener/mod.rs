//! Listener worker: the background thread that owns the channel.
//!
//! One worker per panel instance. The worker thread runs a current-thread
//! tokio runtime driving a single `select!` loop over the stop signal, the
//! outgoing write queue, and the framed read stream. `stop()` signals the
//! watch channel and then joins the thread, so by the time it returns no
//! further cache mutation or host callback can occur - the owning panel is
//! typically about to be destroyed, and a callback after that point would
//! be use-after-free in a native host.
//!
//! Loop-local failures (protocol error, I/O error, controller absent) end
//! this worker and leave the panel showing its last-known state; they are
//! never escalated to the hosting process.

use crate::config::PanelConfig;
use crate::cache::SharedRenderState;
use crate::dispatch::{DispatchContext, EventForwarder, PendingResponses, dispatch_message};
use crate::error::pipe::PipeError;
use crate::host::HostHooks;
use crate::transport::{ConnectionState, ConnectionTracker, PipeListener, derive_endpoint};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use log::{error, info, warn};
use tokio::sync::{mpsc, watch};

/// Lifecycle of the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    NotStarted,
    Running,
    StopRequested,
    Stopped,
}

/// Owning handle to the worker. Exactly one per panel instance; the thread
/// never outlives the handle because both `stop()` and `Drop` join it.
pub struct ListenerHandle {
    state: ListenerState,
    stop_tx: watch::Sender<bool>,
    join: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Bind the panel's channel endpoint and spawn the worker.
    ///
    /// Binding happens on the caller's thread so an endpoint collision
    /// surfaces here as `Connection`; waiting for the controller happens on
    /// the worker. Returns the handle plus the host-side event forwarder
    /// wired to this worker's outgoing queue.
    pub fn start(
        channel_name: &str,
        config: &PanelConfig,
        cache: SharedRenderState,
        hooks: Arc<dyn HostHooks>,
    ) -> Result<(Self, EventForwarder), PipeError> {
        let endpoint = derive_endpoint(channel_name, &config.channel);
        let listener = PipeListener::bind(endpoint)?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        let pending = Arc::new(PendingResponses::new());
        let forwarder = EventForwarder::new(outgoing_tx, Arc::clone(&pending));

        let ctx = DispatchContext {
            cache,
            hooks,
            pending,
        };
        let max_frame_len = config.render.max_frame_len;

        let join = thread::Builder::new()
            .name(format!("taskband-listener-{channel_name}"))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_io()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("listener runtime build failed: {e}");
                        ctx.pending.abort_all();
                        return;
                    }
                };

                runtime.block_on(run_worker(listener, max_frame_len, stop_rx, outgoing_rx, ctx));
            })
            .map_err(|e| PipeError::Io {
                message: format!("failed to spawn listener thread: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("listener worker started for channel {channel_name:?} on {endpoint}");
        Ok((
            Self {
                state: ListenerState::Running,
                stop_tx,
                join: Some(join),
            },
            forwarder,
        ))
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Stop and join the worker.
    ///
    /// Ordering is strict: mark stop-requested, signal the watch channel
    /// (which aborts a pending blocking read via the worker's `select!`),
    /// then join. Returns only after the worker thread has fully
    /// terminated. Idempotent.
    pub fn stop(&mut self) {
        if self.state == ListenerState::Stopped {
            return;
        }
        self.state = ListenerState::StopRequested;

        // Receiver may already be gone if the worker exited on its own.
        let _ = self.stop_tx.send(true);

        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("listener worker thread panicked");
            }
        }

        self.state = ListenerState::Stopped;
        info!("listener worker stopped");
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The worker loop. Owns the transport for its entire lifetime.
async fn run_worker(
    listener: PipeListener,
    max_frame_len: u32,
    mut stop_rx: watch::Receiver<bool>,
    mut outgoing_rx: mpsc::UnboundedReceiver<Bytes>,
    ctx: DispatchContext,
) {
    let endpoint = listener.local_addr();
    let mut connection = ConnectionTracker::new();
    connection.advance(ConnectionState::Connecting);

    let transport = tokio::select! {
        biased;

        _ = stop_rx.changed() => {
            info!("stop requested before controller connected on {endpoint}");
            connection.advance(ConnectionState::Closed);
            ctx.pending.abort_all();
            return;
        }
        accepted = listener.accept(max_frame_len) => match accepted {
            Ok(transport) => transport,
            Err(e) => {
                error!("controller accept failed: {e}");
                connection.advance(ConnectionState::Closed);
                ctx.pending.abort_all();
                return;
            }
        }
    };

    connection.advance(ConnectionState::Connected);
    let (mut reader, mut writer) = transport.into_split();

    loop {
        tokio::select! {
            biased;

            _ = stop_rx.changed() => {
                info!("stop requested; closing channel on {endpoint}");
                break;
            }

            frame = outgoing_rx.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = writer.write_frame(frame).await {
                        error!("outgoing write failed: {e}");
                        break;
                    }
                }
                // Every sender dropped: the owning panel is gone.
                None => break,
            },

            incoming = reader.read_message() => match incoming {
                Ok(Some(message)) => {
                    if let Err(e) = dispatch_message(message, &ctx, &mut writer).await {
                        error!("dispatch write-back failed: {e}");
                        break;
                    }
                }
                Ok(None) => {
                    info!("controller disconnected from {endpoint}");
                    break;
                }
                Err(e) => {
                    match e {
                        PipeError::Protocol { .. } => warn!("malformed frame, closing: {e}"),
                        _ => error!("channel read failed: {e}"),
                    }
                    break;
                }
            },
        }
    }

    info!("listener worker leaving {:?} on {endpoint}", connection.state());
    connection.advance(ConnectionState::Closing);
    writer.close().await;

    // Unblock any host thread still waiting on a forwarded event.
    ctx.pending.abort_all();
    connection.advance(ConnectionState::Closed);
}
