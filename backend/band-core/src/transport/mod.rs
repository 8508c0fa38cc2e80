//! Channel transport: the duplex byte stream between panel and controller.
//!
//! The panel owns the named endpoint. [`PipeListener::bind`] claims it
//! synchronously on the caller's thread, so an endpoint collision surfaces
//! as a `Connection` error before any worker exists; the accept wait and
//! everything after it belong to the listener worker. One controller
//! connection per panel; non-loopback peers are rejected.

mod connection_state;
mod endpoint;

pub use connection_state::ConnectionState;
pub(crate) use connection_state::ConnectionTracker;
pub use endpoint::derive_endpoint;

use crate::error::pipe::PipeError;
use crate::protocol::{FrameBuffer, ProtocolMessage, encode_message};

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;

use bytes::Bytes;
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// Bound but not yet accepted endpoint.
pub struct PipeListener {
    std_listener: std::net::TcpListener,
    local: SocketAddr,
}

impl PipeListener {
    /// Claim the endpoint. Fails with `Connection` if it is already taken
    /// or the process lacks permission to bind it.
    pub fn bind(endpoint: SocketAddr) -> Result<Self, PipeError> {
        let std_listener =
            std::net::TcpListener::bind(endpoint).map_err(|e| PipeError::Connection {
                message: format!("failed to bind channel endpoint {endpoint}: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Required for handoff into the worker's tokio runtime.
        std_listener.set_nonblocking(true)?;

        info!("channel endpoint bound on {endpoint}");
        Ok(Self {
            std_listener,
            local: endpoint,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Wait for the controller to connect. Must run inside the worker's
    /// runtime. Rejects non-loopback peers and keeps waiting.
    pub async fn accept(self, max_frame_len: u32) -> Result<PipeTransport, PipeError> {
        let listener = TcpListener::from_std(self.std_listener)?;

        loop {
            let (stream, peer) = listener.accept().await.map_err(|e| PipeError::Connection {
                message: format!("accept on {} failed: {e}", self.local),
                location: ErrorLocation::from(Location::caller()),
            })?;

            if !peer.ip().is_loopback() {
                // Silent rejection; a remote prober learns nothing.
                warn!("rejected non-loopback controller connection from {peer}");
                continue;
            }

            if let Err(e) = stream.set_nodelay(true) {
                debug!("set_nodelay failed: {e}");
            }

            info!("controller connected from {peer}");
            return Ok(PipeTransport::new(stream, max_frame_len));
        }
    }
}

/// Connected duplex stream, framed.
pub struct PipeTransport {
    reader: PipeReader,
    writer: PipeWriter,
}

impl PipeTransport {
    fn new(stream: tokio::net::TcpStream, max_frame_len: u32) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: PipeReader {
                half: read_half,
                frames: FrameBuffer::new(max_frame_len),
            },
            writer: PipeWriter { half: write_half },
        }
    }

    /// Split so the worker can await a read while handlers write.
    pub fn into_split(self) -> (PipeReader, PipeWriter) {
        (self.reader, self.writer)
    }
}

/// Read half plus the frame accumulation buffer.
pub struct PipeReader {
    half: OwnedReadHalf,
    frames: FrameBuffer,
}

impl PipeReader {
    /// Await one complete framed message.
    ///
    /// `Ok(None)` means the peer disconnected cleanly (channel closed).
    /// EOF in the middle of a buffered frame is a protocol error. The
    /// future is cancel-safe: partial frames stay in the buffer.
    pub async fn read_message(&mut self) -> Result<Option<ProtocolMessage>, PipeError> {
        loop {
            if let Some(message) = self.frames.try_extract()? {
                return Ok(Some(message));
            }

            let read = self
                .half
                .read_buf(self.frames.buf_mut())
                .await
                .map_err(|e| PipeError::Read {
                    message: format!("channel read failed: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            if read == 0 {
                if self.frames.is_empty() {
                    return Ok(None);
                }
                return Err(PipeError::Protocol {
                    message: String::from("peer disconnected mid-frame"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}

/// Write half. Single writer by construction: only the listener worker
/// holds it, and host-side senders go through the worker's outgoing queue.
pub struct PipeWriter {
    half: OwnedWriteHalf,
}

impl PipeWriter {
    pub async fn write_message(&mut self, message: &ProtocolMessage) -> Result<(), PipeError> {
        self.write_frame(encode_message(message)).await
    }

    /// Write one pre-encoded frame in full.
    pub async fn write_frame(&mut self, frame: Bytes) -> Result<(), PipeError> {
        self.half
            .write_all(&frame)
            .await
            .map_err(|e| PipeError::Send {
                message: format!("channel write failed: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Idempotent teardown of the write direction; the peer observes EOF.
    pub async fn close(&mut self) {
        if let Err(e) = self.half.shutdown().await {
            debug!("channel shutdown: {e}");
        }
    }
}
