//! MSB-first bit access over byte buffers.
//!
//! Codec configuration records such as the AAC AudioSpecificConfig pack
//! fields at arbitrary bit offsets, and synthesized headers (ADTS) are
//! written the same way. Both sides move in whole-byte chunks where they can.

use crate::error::{BitstreamError, Result};

/// Widest field either side handles in one call.
pub const MAX_FIELD_BITS: u8 = 32;

/// Reads bit fields from a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute bit offset of the next read.
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining_bits(&self) -> usize {
        self.total_bits() - self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.total_bits()
    }

    fn ensure(&self, bits: usize) -> Result<()> {
        if self.remaining_bits() < bits {
            return Err(BitstreamError::UnexpectedEnd {
                needed: bits,
                available: self.remaining_bits(),
            }
            .into());
        }
        Ok(())
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        self.read_bits(1).map(|bit| bit != 0)
    }

    /// Read an `n`-bit unsigned field, `n <= 32`.
    ///
    /// Nothing is consumed when the field does not fit.
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        if n > MAX_FIELD_BITS {
            return Err(BitstreamError::FieldTooWide(n).into());
        }
        self.ensure(n as usize)?;

        let mut value = 0u32;
        let mut left = n as usize;
        while left > 0 {
            let offset = self.pos % 8;
            let available = 8 - offset;
            let take = available.min(left);
            let byte = self.data[self.pos / 8];
            let chunk = (byte >> (available - take)) & (0xFF >> (8 - take));
            value = (value << take) | chunk as u32;
            self.pos += take;
            left -= take;
        }
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }
}

/// Builds a byte buffer from bit fields.
///
/// A partially written last byte is already present in [`data`](Self::data),
/// padded with zero bits.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    len_bits: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            len_bits: 0,
        }
    }

    /// Bits written so far.
    pub fn position(&self) -> usize {
        self.len_bits
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.len_bits % 8 == 0
    }

    pub fn write_bit(&mut self, bit: bool) {
        // Cannot fail: one bit always fits.
        let _ = self.write_bits(bit as u32, 1);
    }

    /// Write the low `n` bits of `value`, most significant first.
    ///
    /// Fails without writing when `value` has bits set above `n`.
    pub fn write_bits(&mut self, value: u32, n: u8) -> Result<()> {
        if n > MAX_FIELD_BITS {
            return Err(BitstreamError::FieldTooWide(n).into());
        }
        if n < MAX_FIELD_BITS && value >> n != 0 {
            return Err(BitstreamError::ValueOverflow {
                value: value as u64,
                bits: n,
            }
            .into());
        }

        let mut left = n as usize;
        while left > 0 {
            let offset = self.len_bits % 8;
            if offset == 0 {
                self.data.push(0);
            }
            let free = 8 - offset;
            let take = free.min(left);
            let chunk = ((value >> (left - take)) as u8) & (0xFF >> (8 - take));
            if let Some(last) = self.data.last_mut() {
                *last |= chunk << (free - take);
            }
            self.len_bits += take;
            left -= take;
        }
        Ok(())
    }

    /// Pad with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        self.len_bits = self.data.len() * 8;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
