//! Low-level frame encoding and decoding.

use crate::error::pipe::PipeError;
use crate::protocol::{ProtocolMessage, tag};

use common::ErrorLocation;

use std::panic::Location;

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Bytes of the `u32 LE` length prefix in front of every frame.
pub const FRAME_HEADER_LEN: usize = 4;

/// Upper bound on `length` accepted by the decoder unless configured
/// otherwise. Generous for text items plus style blobs, small enough that
/// a corrupted length cannot balloon the read buffer.
pub const DEFAULT_MAX_FRAME_LEN: u32 = 64 * 1024;

/// Encode one message into a ready-to-write frame.
///
/// Pure and total: encoding never fails and never does I/O.
pub fn encode_message(message: &ProtocolMessage) -> Bytes {
    let mut body = BytesMut::new();
    body.put_u8(message.tag());

    match message {
        ProtocolMessage::SetItem {
            id,
            text,
            x,
            y,
            style,
        } => {
            put_string(&mut body, id);
            put_string(&mut body, text);
            body.put_i32_le(*x);
            body.put_i32_le(*y);
            put_blob(&mut body, style);
        }
        ProtocolMessage::RemoveItem { id } => {
            put_string(&mut body, id);
        }
        ProtocolMessage::ClearAll => {}
        ProtocolMessage::ForwardEvent {
            request_id,
            message_id,
            param,
        } => {
            body.put_u64_le(*request_id);
            body.put_u32_le(*message_id);
            put_blob(&mut body, param);
        }
        ProtocolMessage::Ping { request_id } => {
            body.put_u64_le(*request_id);
        }
        ProtocolMessage::Response {
            request_id,
            payload,
        } => {
            body.put_u64_le(*request_id);
            put_blob(&mut body, payload);
        }
    }

    let mut frame = BytesMut::with_capacity(FRAME_HEADER_LEN + body.len());
    frame.put_u32_le(body.len() as u32);
    frame.extend_from_slice(&body);
    frame.freeze()
}

/// Decode a complete frame body (tag already stripped by the caller).
///
/// Strict: the entire payload must be consumed, otherwise the frame is
/// malformed and the connection must be closed.
pub(crate) fn decode_body(frame_tag: u8, mut payload: Bytes) -> Result<ProtocolMessage, PipeError> {
    let message = match frame_tag {
        tag::SET_ITEM => {
            let id = get_string(&mut payload)?;
            let text = get_string(&mut payload)?;
            let x = get_i32(&mut payload)?;
            let y = get_i32(&mut payload)?;
            let style = get_blob(&mut payload)?;
            ProtocolMessage::SetItem {
                id,
                text,
                x,
                y,
                style,
            }
        }
        tag::REMOVE_ITEM => ProtocolMessage::RemoveItem {
            id: get_string(&mut payload)?,
        },
        tag::CLEAR_ALL => ProtocolMessage::ClearAll,
        tag::FORWARD_EVENT => {
            let request_id = get_u64(&mut payload)?;
            let message_id = get_u32(&mut payload)?;
            let param = get_blob(&mut payload)?;
            ProtocolMessage::ForwardEvent {
                request_id,
                message_id,
                param,
            }
        }
        tag::PING => ProtocolMessage::Ping {
            request_id: get_u64(&mut payload)?,
        },
        tag::RESPONSE => {
            let request_id = get_u64(&mut payload)?;
            let payload = get_blob(&mut payload)?;
            ProtocolMessage::Response {
                request_id,
                payload,
            }
        }
        unknown => {
            return Err(protocol_error(format!("unknown frame tag {unknown}")));
        }
    };

    if payload.has_remaining() {
        return Err(protocol_error(format!(
            "{} trailing bytes after tag {frame_tag} payload",
            payload.remaining(),
        )));
    }

    Ok(message)
}

fn put_string(buf: &mut BytesMut, value: &str) {
    buf.put_u32_le(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

fn put_blob(buf: &mut BytesMut, value: &[u8]) {
    buf.put_u32_le(value.len() as u32);
    buf.put_slice(value);
}

fn get_string(buf: &mut Bytes) -> Result<String, PipeError> {
    let raw = get_blob(buf)?;
    String::from_utf8(raw.to_vec())
        .map_err(|e| protocol_error(format!("invalid UTF-8 in string field: {e}")))
}

fn get_blob(buf: &mut Bytes) -> Result<Bytes, PipeError> {
    let len = get_u32(buf)? as usize;
    if buf.remaining() < len {
        return Err(protocol_error(format!(
            "blob length {len} exceeds remaining payload ({})",
            buf.remaining()
        )));
    }
    Ok(buf.split_to(len))
}

fn get_u32(buf: &mut Bytes) -> Result<u32, PipeError> {
    require(buf, 4)?;
    Ok(buf.get_u32_le())
}

fn get_u64(buf: &mut Bytes) -> Result<u64, PipeError> {
    require(buf, 8)?;
    Ok(buf.get_u64_le())
}

fn get_i32(buf: &mut Bytes) -> Result<i32, PipeError> {
    require(buf, 4)?;
    Ok(buf.get_i32_le())
}

fn require(buf: &Bytes, needed: usize) -> Result<(), PipeError> {
    if buf.remaining() < needed {
        return Err(protocol_error(format!(
            "payload truncated: needed {needed} bytes, have {}",
            buf.remaining()
        )));
    }
    Ok(())
}

#[track_caller]
pub(crate) fn protocol_error(message: String) -> PipeError {
    PipeError::Protocol {
        message,
        location: ErrorLocation::from(Location::caller()),
    }
}
