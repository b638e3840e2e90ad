//! Bounded read cursor over a borrowed input buffer.

use crate::error::{MkvError, Result};
use byteorder::{BigEndian, ByteOrder};

/// A position within an immutable byte buffer.
///
/// The position never exceeds the buffer length. Reads hand out sub-slices
/// of the original input, so frames can borrow from it without copying.
#[derive(Debug, Clone)]
pub struct ElementCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ElementCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current absolute position.
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether the cursor sits at the end of the buffer.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Read up to `n` bytes, advancing past them.
    ///
    /// Returns fewer than `n` bytes only at the end of the buffer.
    pub fn read(&mut self, n: usize) -> &'a [u8] {
        let take = n.min(self.remaining());
        let out = &self.data[self.pos..self.pos + take];
        self.pos += take;
        out
    }

    /// Read exactly `n` bytes or fail without moving.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(MkvError::UnexpectedEof {
                offset: self.pos as u64,
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(self.read(n))
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Read a big-endian u16.
    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_exact(2)?))
    }

    /// Read a big-endian i16.
    pub fn read_i16_be(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.read_exact(2)?))
    }

    /// Move to an absolute position; positions past the end are rejected.
    pub fn seek(&mut self, target: usize) -> Result<()> {
        if target > self.data.len() {
            return Err(MkvError::SeekOutOfBounds {
                target: target as u64,
                len: self.data.len() as u64,
            });
        }
        self.pos = target;
        Ok(())
    }

    /// Advance by `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        let target = usize::try_from(n)
            .ok()
            .and_then(|n| self.pos.checked_add(n))
            .ok_or(MkvError::SeekOutOfBounds {
                target: u64::MAX,
                len: self.data.len() as u64,
            })?;
        self.seek(target)
    }
}
