//! Bounds-checked sequential reader over an in-memory byte slice.

use byteorder::{ByteOrder, LittleEndian};

use crate::decoder::DecodeError;
use crate::types::Color;

/// Forward-only little-endian reader.
///
/// Every read either returns the requested value and advances, or fails with
/// [`DecodeError::Truncated`] without advancing. Offsets in errors are
/// reported relative to `base`, so a cursor over a sub-block can still point
/// at the byte position within the whole header record.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Creates a cursor whose reported offsets start at `base`.
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Absolute offset of the next unread byte.
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Reads exactly `n` bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                offset: self.offset(),
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_exact(1)?[0])
    }

    #[inline]
    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        Ok(LittleEndian::read_u16(self.read_exact(2)?))
    }

    #[inline]
    pub fn read_i16_le(&mut self) -> Result<i16, DecodeError> {
        Ok(LittleEndian::read_i16(self.read_exact(2)?))
    }

    #[inline]
    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.read_exact(4)?))
    }

    /// Reads a zero-terminated single-byte string.
    ///
    /// Each byte maps to the character with the same code point. The
    /// terminator is consumed but not returned. Running out of bytes before a
    /// terminator is `Truncated`, and the cursor is left where it was.
    pub fn read_nul_terminated_string(&mut self) -> Result<String, DecodeError> {
        let rest = &self.data[self.pos..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(DecodeError::Truncated {
                offset: self.offset(),
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let text = rest[..len].iter().map(|&b| b as char).collect();
        self.pos += len + 1;
        Ok(text)
    }

    /// Reads a 3-byte RGB triple as an opaque color.
    pub fn read_color(&mut self) -> Result<Color, DecodeError> {
        let rgb = self.read_exact(3)?;
        Ok(Color::from_rgb(rgb[0], rgb[1], rgb[2]))
    }
}
