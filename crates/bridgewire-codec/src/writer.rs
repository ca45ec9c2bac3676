use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::CodecConfig;
use crate::error::EncodeError;
use crate::tag::{SIZE_U16, SIZE_U32};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Accumulates one encoded message.
///
/// Alignment is computed from the start of this writer's buffer, which is
/// the start of the message.
pub struct ValueWriter {
    buf: BytesMut,
    depth: usize,
    config: CodecConfig,
}

impl ValueWriter {
    /// Create a writer for a fresh message.
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            depth: 0,
            config: config.clone(),
        }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn put_u8(&mut self, byte: u8) {
        self.buf.put_u8(byte);
    }

    pub fn put_i32(&mut self, n: i32) {
        self.buf.put_i32_le(n);
    }

    pub fn put_i64(&mut self, n: i64) {
        self.buf.put_i64_le(n);
    }

    pub fn put_f64(&mut self, n: f64) {
        self.buf.put_f64_le(n);
    }

    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a variable-width size prefix.
    ///
    /// ```text
    /// 0..=253        1 byte
    /// 254..=0xFFFF   0xFE + u16 LE
    /// above          0xFF + u32 LE
    /// ```
    pub fn put_size(&mut self, len: usize, kind: &'static str) -> Result<(), EncodeError> {
        if len < SIZE_U16 as usize {
            self.buf.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.buf.put_u8(SIZE_U16);
            self.buf.put_u16_le(len as u16);
        } else if len <= u32::MAX as usize {
            self.buf.put_u8(SIZE_U32);
            self.buf.put_u32_le(len as u32);
        } else {
            return Err(EncodeError::TooLarge { kind, len });
        }
        Ok(())
    }

    /// Pad with zero bytes until the position is a multiple of `width`.
    pub fn align(&mut self, width: usize) {
        let pad = padding_for(self.buf.len(), width);
        self.buf.put_bytes(0, pad);
    }

    /// Enter a container; fails past the configured depth.
    pub fn enter(&mut self) -> Result<(), EncodeError> {
        if self.depth >= self.config.max_depth {
            return Err(EncodeError::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Finish the message, enforcing the configured size limit.
    pub fn finish(self) -> Result<Bytes, EncodeError> {
        if self.buf.len() > self.config.max_message_size {
            return Err(EncodeError::MessageTooLarge {
                size: self.buf.len(),
                max: self.config.max_message_size,
            });
        }
        Ok(self.buf.freeze())
    }
}

/// Zero bytes needed after `offset` to reach a multiple of `width`.
pub(crate) fn padding_for(offset: usize, width: usize) -> usize {
    (width - offset % width) % width
}
