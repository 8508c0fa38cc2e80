//! Control-pipe wire protocol.
//!
//! Every message the panel exchanges with its controller is one
//! self-delimiting frame:
//!
//! ```text
//! [length: u32 LE][tag: u8][payload]
//! ```
//!
//! where `length` covers the tag byte plus the payload. Integers are
//! little-endian; strings and blobs are `u32 LE` length-prefixed. The
//! encoder is pure and total; the decoder is strict - an unknown tag,
//! an oversize length, or leftover bytes inside a complete frame is a
//! protocol error and the connection is closed. There is no attempt to
//! resynchronize mid-stream, since resynchronization risks executing
//! corrupted render commands.

mod frame_buffer;
mod wire;

pub use frame_buffer::FrameBuffer;
pub use wire::{DEFAULT_MAX_FRAME_LEN, FRAME_HEADER_LEN, encode_message};

use bytes::Bytes;

/// Frame type tags.
pub(crate) mod tag {
    pub const SET_ITEM: u8 = 1;
    pub const REMOVE_ITEM: u8 = 2;
    pub const CLEAR_ALL: u8 = 3;
    pub const FORWARD_EVENT: u8 = 4;
    pub const PING: u8 = 5;
    pub const RESPONSE: u8 = 6;
}

/// One decoded control-pipe message.
///
/// `SetItem`/`RemoveItem`/`ClearAll`/`Ping` arrive from the controller;
/// `ForwardEvent` is sent by the panel; `Response` flows both ways and is
/// correlated with `Ping`/`ForwardEvent` by `request_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolMessage {
    /// Insert or replace one render item (last write wins).
    SetItem {
        id: String,
        text: String,
        x: i32,
        y: i32,
        /// Opaque style blob; the core never interprets it.
        style: Bytes,
    },

    /// Remove one render item; a no-op if the id is absent.
    RemoveItem { id: String },

    /// Empty the render cache.
    ClearAll,

    /// A host window event offered to the controller for handling.
    ForwardEvent {
        request_id: u64,
        message_id: u32,
        param: Bytes,
    },

    /// Liveness probe; answered immediately with an empty `Response`.
    Ping { request_id: u64 },

    /// Reply to a `Ping` or `ForwardEvent`. For forwarded events a non-zero
    /// first payload byte means "handled".
    Response { request_id: u64, payload: Bytes },
}

impl ProtocolMessage {
    /// Wire tag for this variant.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            ProtocolMessage::SetItem { .. } => tag::SET_ITEM,
            ProtocolMessage::RemoveItem { .. } => tag::REMOVE_ITEM,
            ProtocolMessage::ClearAll => tag::CLEAR_ALL,
            ProtocolMessage::ForwardEvent { .. } => tag::FORWARD_EVENT,
            ProtocolMessage::Ping { .. } => tag::PING,
            ProtocolMessage::Response { .. } => tag::RESPONSE,
        }
    }
}
