use bytes::{Buf, Bytes};

use crate::codec::CodecConfig;
use crate::error::{DecodeError, Result};
use crate::tag::{SIZE_U16, SIZE_U32};
use crate::writer::padding_for;

/// Cursor over one encoded message.
///
/// Offsets are relative to the first byte of the message, which is what the
/// writer aligned against.
pub struct ValueReader {
    src: Bytes,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl ValueReader {
    pub fn new(src: Bytes, config: &CodecConfig) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// Current offset from the start of the message.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.src.len() - self.pos
    }

    /// Take exactly `n` bytes without copying.
    pub fn take(&mut self, n: usize) -> Result<Bytes> {
        if n > self.remaining() {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = self.src.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    /// Take `count` elements of `width` bytes each, rejecting counts the
    /// buffer cannot possibly hold.
    pub fn take_counted(
        &mut self,
        count: usize,
        width: usize,
        kind: &'static str,
    ) -> Result<Bytes> {
        let overrun = || DecodeError::CountOverrun {
            kind,
            count,
            remaining: self.remaining(),
        };
        let len = count.checked_mul(width).ok_or_else(overrun)?;
        if len > self.remaining() {
            return Err(overrun());
        }
        self.take(len)
    }

    /// Fail early when a container claims more elements than bytes remain.
    pub fn check_count(&self, count: usize, min_width: usize, kind: &'static str) -> Result<()> {
        match count.checked_mul(min_width) {
            Some(len) if len <= self.remaining() => Ok(()),
            _ => Err(DecodeError::CountOverrun {
                kind,
                count,
                remaining: self.remaining(),
            }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?.get_u8())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.take(4)?.get_i32_le())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.take(8)?.get_i64_le())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(self.take(8)?.get_f64_le())
    }

    /// Read a variable-width size prefix.
    pub fn read_size(&mut self) -> Result<usize> {
        let first = self.read_u8()?;
        let size = match first {
            SIZE_U16 => self.take(2)?.get_u16_le() as usize,
            SIZE_U32 => self.take(4)?.get_u32_le() as usize,
            small => small as usize,
        };
        Ok(size)
    }

    /// Skip the zero padding the writer inserted before a `width`-aligned payload.
    pub fn skip_alignment(&mut self, width: usize) -> Result<()> {
        let pad = padding_for(self.pos, width);
        self.take(pad).map(|_| ())
    }

    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(DecodeError::DepthExceeded {
                max: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &'static [u8]) -> ValueReader {
        ValueReader::new(Bytes::from_static(bytes), &CodecConfig::default())
    }

    #[test]
    fn reads_little_endian_scalars() {
        let mut r = reader(&[1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(r.read_i32().unwrap(), 1);
        assert_eq!(r.read_i64().unwrap(), -1);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn size_prefix_escapes() {
        let mut r = reader(&[253, 254, 0x00, 0x01, 255, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(r.read_size().unwrap(), 253);
        assert_eq!(r.read_size().unwrap(), 256);
        assert_eq!(r.read_size().unwrap(), 0x1_0000);
    }

    #[test]
    fn truncated_read_reports_offset() {
        let mut r = reader(&[1, 2]);
        r.read_u8().unwrap();
        let err = r.read_i32().unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: 1,
                needed: 4,
                remaining: 1
            }
        );
    }

    #[test]
    fn skip_alignment_follows_offset() {
        let mut r = reader(&[9, 0, 0, 0, 42]);
        r.read_u8().unwrap();
        r.skip_alignment(4).unwrap();
        assert_eq!(r.position(), 4);
        assert_eq!(r.read_u8().unwrap(), 42);
    }

    #[test]
    fn take_counted_rejects_overrun() {
        let mut r = reader(&[0; 8]);
        let err = r.take_counted(3, 4, "int32 array").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::CountOverrun {
                kind: "int32 array",
                count: 3,
                remaining: 8
            }
        ));
    }

    #[test]
    fn take_counted_rejects_multiplication_overflow() {
        let mut r = reader(&[0; 8]);
        assert!(r.take_counted(usize::MAX, 8, "int64 array").is_err());
    }

    #[test]
    fn take_is_zero_copy() {
        let src = Bytes::from_static(b"abcdef");
        let mut r = ValueReader::new(src.clone(), &CodecConfig::default());
        let part = r.take(3).unwrap();
        assert_eq!(part.as_ptr(), src.as_ptr());
    }
}
