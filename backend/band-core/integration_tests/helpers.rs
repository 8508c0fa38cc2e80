//! Test helpers for panel integration tests.
//!
//! This module provides a minimal in-process controller for exercising the
//! panel end to end:
//! - Connecting to the panel's derived channel endpoint
//! - Sending/receiving framed protocol messages
//! - Host hook and draw surface doubles with observable state

use band_core::cache::RenderItem;
use band_core::config::PanelConfig;
use band_core::host::HostHooks;
use band_core::painter::DrawSurface;
use band_core::protocol::{DEFAULT_MAX_FRAME_LEN, FrameBuffer, ProtocolMessage, encode_message};
use band_core::transport::derive_endpoint;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Host hook double that counts repaint requests.
#[derive(Default)]
pub struct CountingHooks {
    repaints: AtomicUsize,
}

impl CountingHooks {
    pub fn repaints(&self) -> usize {
        self.repaints.load(Ordering::SeqCst)
    }
}

impl HostHooks for CountingHooks {
    fn request_repaint(&self) {
        self.repaints.fetch_add(1, Ordering::SeqCst);
    }
}

/// Draw surface double that records every call as a string op.
#[derive(Default)]
pub struct RecordingSurface {
    pub ops: Vec<String>,
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.push(String::from("clear"));
    }

    fn draw_text(&mut self, item: &RenderItem) {
        self.ops
            .push(format!("text {} {:?} ({}, {})", item.id, item.text, item.x, item.y));
    }
}

/// In-process controller endpoint: a raw stream plus frame accumulation,
/// speaking the same wire format the panel does.
pub struct Controller {
    stream: TcpStream,
    frames: FrameBuffer,
}

impl Controller {
    /// Connect to the panel's channel. Retries briefly so tests are not
    /// sensitive to worker startup timing.
    pub async fn connect(channel_name: &str, config: &PanelConfig) -> Self {
        let endpoint = derive_endpoint(channel_name, &config.channel);

        for _ in 0..50 {
            match TcpStream::connect(endpoint).await {
                Ok(stream) => {
                    stream.set_nodelay(true).expect("set_nodelay");
                    return Self {
                        stream,
                        frames: FrameBuffer::new(DEFAULT_MAX_FRAME_LEN),
                    };
                }
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }

        panic!("controller failed to connect to {endpoint}");
    }

    /// Send one framed message.
    pub async fn send(&mut self, message: &ProtocolMessage) {
        self.stream
            .write_all(&encode_message(message))
            .await
            .expect("controller send failed");
    }

    /// Send raw bytes, ignoring failures. Used for post-shutdown probes
    /// where the peer may already have closed the stream.
    pub async fn send_raw_ignoring_errors(&mut self, bytes: &[u8]) {
        let _ = self.stream.write_all(bytes).await;
    }

    /// Receive one complete framed message.
    pub async fn read(&mut self) -> ProtocolMessage {
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(message) = self.frames.try_extract().expect("controller decode failed") {
                return message;
            }

            let read = self
                .stream
                .read(&mut chunk)
                .await
                .expect("controller read failed");
            assert!(read > 0, "panel closed the channel while a message was expected");
            self.frames.extend(&chunk[..read]);
        }
    }
}

/// Convenience constructor for a `SetItem` message.
pub fn set_item(id: &str, text: &str, x: i32, y: i32) -> ProtocolMessage {
    ProtocolMessage::SetItem {
        id: String::from(id),
        text: String::from(text),
        x,
        y,
        style: Bytes::new(),
    }
}

/// Poll a condition until it holds or the deadline passes.
pub async fn wait_until(mut condition: impl FnMut() -> bool, what: &str) {
    for _ in 0..250 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

/// A started panel with its observable hooks, on a fresh channel.
pub fn start_test_panel() -> (band_core::panel::Panel, Arc<CountingHooks>, String) {
    let hooks = Arc::new(CountingHooks::default());
    let mut panel = band_core::panel::Panel::new(PanelConfig::default(), hooks.clone());
    let channel_name = band_core::panel::Panel::generate_channel_name();
    panel
        .start(&channel_name)
        .expect("panel start should succeed on a fresh channel");
    (panel, hooks, channel_name)
}
