//! Accumulation buffer for partial transport reads.

use crate::error::pipe::PipeError;
use crate::protocol::ProtocolMessage;
use crate::protocol::wire::{FRAME_HEADER_LEN, decode_body, protocol_error};

use bytes::{Buf, BytesMut};

/// Growable byte buffer fed by transport reads.
///
/// The transport appends raw bytes; [`FrameBuffer::try_extract`] pops one
/// complete decoded message at a time. Bytes belonging to a frame that has
/// not fully arrived stay buffered, so reads can be cancelled and resumed
/// without losing stream position.
pub struct FrameBuffer {
    buf: BytesMut,
    max_frame_len: u32,
}

impl FrameBuffer {
    pub fn new(max_frame_len: u32) -> Self {
        Self {
            buf: BytesMut::with_capacity(FRAME_HEADER_LEN + 256),
            max_frame_len,
        }
    }

    /// Append raw bytes from the transport.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Direct access for `read_buf`-style appends.
    pub(crate) fn buf_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// True when no partial frame is buffered (a clean stream position).
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Try to pop one complete message.
    ///
    /// Returns `Ok(None)` when more bytes are needed ("incomplete"), and
    /// `Err(PipeError::Protocol)` for a malformed frame - in which case the
    /// caller must close the connection.
    pub fn try_extract(&mut self) -> Result<Option<ProtocolMessage>, PipeError> {
        if self.buf.len() < FRAME_HEADER_LEN {
            return Ok(None);
        }

        let length = u32::from_le_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]);
        if length == 0 {
            return Err(protocol_error(String::from(
                "zero-length frame (missing tag byte)",
            )));
        }
        if length > self.max_frame_len {
            return Err(protocol_error(format!(
                "frame length {length} exceeds limit {}",
                self.max_frame_len
            )));
        }

        let total = FRAME_HEADER_LEN + length as usize;
        if self.buf.len() < total {
            return Ok(None);
        }

        self.buf.advance(FRAME_HEADER_LEN);
        let mut body = self.buf.split_to(length as usize).freeze();
        let frame_tag = body.get_u8();
        decode_body(frame_tag, body).map(Some)
    }
}
