//! EBML (Extensible Binary Meta Language) variable-length integers and
//! primitive element values.
//!
//! EBML VINTs use a leading bit pattern to indicate the length:
//! - 1xxxxxxx: 1 byte (7 bits of data)
//! - 01xxxxxx xxxxxxxx: 2 bytes (14 bits)
//! - 001xxxxx xxxxxxxx xxxxxxxx: 3 bytes (21 bits)
//! - etc., up to 8 bytes.
//!
//! Element IDs keep the marker bit as part of their value; sizes, block
//! track numbers and lacing sizes strip it.

use crate::cursor::ElementCursor;
use crate::error::{MkvError, Result};
use byteorder::{BigEndian, ByteOrder};

/// Maximum VINT length in bytes.
pub const MAX_VINT_LENGTH: usize = 8;

/// Width of a VINT from its first byte, or `None` for a zero byte.
#[inline]
pub fn vint_width(first: u8) -> Option<usize> {
    if first == 0 {
        None
    } else {
        Some(first.leading_zeros() as usize + 1)
    }
}

fn decode_vint(data: &[u8], offset: usize, keep_marker: bool) -> Result<(usize, u64)> {
    let first = *data.first().ok_or(MkvError::TruncatedHeader {
        offset: offset as u64,
    })?;
    let width = vint_width(first).ok_or(MkvError::InvalidVint {
        offset: offset as u64,
    })?;
    if data.len() < width {
        return Err(MkvError::TruncatedHeader {
            offset: offset as u64,
        });
    }

    let mut value = if keep_marker {
        first as u64
    } else {
        (first & (0xFF >> width)) as u64
    };
    for &byte in &data[1..width] {
        value = (value << 8) | byte as u64;
    }

    Ok((width, value))
}

/// Decode an element ID from the start of `data`, keeping the marker bit.
///
/// `offset` is only used for error reporting. Returns `(width, id)`.
pub fn decode_id(data: &[u8], offset: usize) -> Result<(usize, u64)> {
    decode_vint(data, offset, true)
}

/// Decode a size VINT from the start of `data`, stripping the marker bit.
///
/// Returns `(width, value)`.
pub fn decode_size(data: &[u8], offset: usize) -> Result<(usize, u64)> {
    decode_vint(data, offset, false)
}

/// Decode a signed (bias-coded) VINT as used by EBML lacing deltas.
///
/// The stored value is `delta + (2^(7*width - 1) - 1)`.
pub fn decode_signed(data: &[u8], offset: usize) -> Result<(usize, i64)> {
    let (width, raw) = decode_size(data, offset)?;
    Ok((width, raw as i64 - signed_bias(width)))
}

#[inline]
fn signed_bias(width: usize) -> i64 {
    (1i64 << (7 * width - 1)) - 1
}

/// Read an element ID at the cursor, advancing past it on success.
pub fn read_vint_id(cur: &mut ElementCursor<'_>) -> Result<(usize, u64)> {
    let (width, id) = decode_id(cur.rest(), cur.tell())?;
    cur.read(width);
    Ok((width, id))
}

/// Read a size VINT at the cursor, advancing past it on success.
pub fn read_vint_size(cur: &mut ElementCursor<'_>) -> Result<(usize, u64)> {
    let (width, size) = decode_size(cur.rest(), cur.tell())?;
    cur.read(width);
    Ok((width, size))
}

/// Calculate the minimum number of bytes needed to encode a size.
///
/// The all-ones pattern of each width is reserved for "unknown size", so
/// a value equal to it moves up one width.
pub fn vint_length(value: u64) -> usize {
    (1..MAX_VINT_LENGTH)
        .find(|&w| value < (1u64 << (7 * w)) - 1)
        .unwrap_or(MAX_VINT_LENGTH)
}

/// Encode a size as a VINT of exactly `width` bytes.
///
/// Returns `None` if the value does not fit.
pub fn encode_size_with_width(value: u64, width: usize) -> Option<([u8; 8], usize)> {
    if !(1..=MAX_VINT_LENGTH).contains(&width) {
        return None;
    }
    let data_bits = 7 * width as u32;
    if data_bits < 64 && value >= (1u64 << data_bits) {
        return None;
    }

    let mut bytes = [0u8; 8];
    let mut v = value;
    for i in (0..width).rev() {
        bytes[i] = (v & 0xFF) as u8;
        v >>= 8;
    }
    bytes[0] |= 0x80 >> (width - 1);

    Some((bytes, width))
}

/// Encode a size as a minimal-width VINT.
pub fn encode_size(value: u64) -> ([u8; 8], usize) {
    let width = vint_length(value);
    // Width 8 holds 56 bits; larger values keep their low 56 bits.
    encode_size_with_width(value & ((1u64 << 56) - 1), width)
        .unwrap_or(([0x01, 0, 0, 0, 0, 0, 0, 0], 8))
}

/// Encode a signed lacing delta as a bias-coded VINT of `width` bytes.
pub fn encode_signed_with_width(value: i64, width: usize) -> Option<([u8; 8], usize)> {
    if !(1..=MAX_VINT_LENGTH).contains(&width) {
        return None;
    }
    let raw = value.checked_add(signed_bias(width))?;
    if raw < 0 {
        return None;
    }
    encode_size_with_width(raw as u64, width)
}

/// Encode an element ID (marker bit included in the value) as its bytes.
pub fn encode_id(id: u64) -> ([u8; 8], usize) {
    let all = id.to_be_bytes();
    let start = all.iter().position(|&b| b != 0).unwrap_or(7);
    let width = 8 - start;
    let mut bytes = [0u8; 8];
    bytes[..width].copy_from_slice(&all[start..]);
    (bytes, width)
}

/// Read an unsigned big-endian integer of any length.
///
/// Lengths above 8 keep the low 64 bits.
pub fn read_unsigned_int(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |value, &byte| (value << 8) | byte as u64)
}

/// Read a float from EBML data.
///
/// Only 4- and 8-byte encodings are defined; other lengths yield `None`.
pub fn read_float(data: &[u8]) -> Option<f64> {
    match data.len() {
        4 => Some(BigEndian::read_f32(data) as f64),
        8 => Some(BigEndian::read_f64(data)),
        _ => None,
    }
}

/// Read a string value, dropping trailing NUL padding.
pub fn read_string(data: &[u8]) -> String {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    String::from_utf8_lossy(&data[..end]).into_owned()
}
