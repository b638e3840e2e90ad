//! SimpleBlock header parsing and lacing.
//!
//! A SimpleBlock payload starts with the track number (size VINT), a signed
//! 16-bit timecode relative to the cluster and a flags byte. Laced blocks
//! then carry `frame_count - 1` and the frame sizes in one of three codings;
//! the last frame always takes whatever bytes remain.

use crate::ebml;
use crate::error::{MkvError, Result};
use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder};

bitflags! {
    /// SimpleBlock flags byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BlockFlags: u8 {
        /// Block contains only keyframes.
        const KEYFRAME = 0x80;
        /// Block should not be displayed.
        const INVISIBLE = 0x08;
        /// Lacing mode, two bits.
        const LACING = 0x06;
        /// Frames may be discarded during playback.
        const DISCARDABLE = 0x01;
    }
}

/// Lacing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lacing {
    /// One frame, the whole payload.
    None,
    /// Sizes as runs of bytes summed until a byte below 255.
    Xiph,
    /// All frames share one size.
    Fixed,
    /// First size as a VINT, then signed VINT deltas.
    Ebml,
}

impl Lacing {
    /// Lacing mode from bits 1-2 of the flags byte.
    pub fn from_flags(flags: BlockFlags) -> Self {
        match (flags & BlockFlags::LACING).bits() >> 1 {
            0 => Lacing::None,
            1 => Lacing::Xiph,
            2 => Lacing::Fixed,
            _ => Lacing::Ebml,
        }
    }
}

/// Fixed fields at the start of every SimpleBlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Track number the block belongs to.
    pub track_number: u64,
    /// Timecode relative to the cluster, in timecode-scale units.
    pub relative_timecode: i16,
    /// Flags byte.
    pub flags: BlockFlags,
    /// Bytes taken by the three fields.
    pub header_size: usize,
}

impl BlockHeader {
    /// Parse the header at the start of a SimpleBlock payload.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (width, track_number) = ebml::decode_size(data, 0)
            .map_err(|_| MkvError::InvalidBlock("Invalid track number".to_string()))?;
        let header_size = width + 3;
        if data.len() < header_size {
            return Err(MkvError::InvalidBlock(format!(
                "Block header needs {} bytes, have {}",
                header_size,
                data.len()
            )));
        }

        Ok(Self {
            track_number,
            relative_timecode: BigEndian::read_i16(&data[width..width + 2]),
            flags: BlockFlags::from_bits_retain(data[width + 2]),
            header_size,
        })
    }

    /// Whether the keyframe flag is set.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(BlockFlags::KEYFRAME)
    }

    /// Lacing mode of the block.
    pub fn lacing(&self) -> Lacing {
        Lacing::from_flags(self.flags)
    }
}

/// A SimpleBlock split into its frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    /// Block header.
    pub header: BlockHeader,
    /// Frame payloads, borrowed from the block data.
    pub frames: Vec<&'a [u8]>,
}

/// Split a SimpleBlock payload into its header and frames.
///
/// With `strict_fixed`, a fixed-size lace whose data does not divide evenly
/// is an error; otherwise the division truncates and trailing bytes are
/// ignored.
pub fn parse_block(data: &[u8], strict_fixed: bool) -> Result<Block<'_>> {
    let header = BlockHeader::parse(data)?;
    let body = &data[header.header_size..];

    let frames = match header.lacing() {
        Lacing::None => vec![body],
        lacing => {
            let (&count_minus_one, laced) = body
                .split_first()
                .ok_or_else(|| MkvError::InvalidLacing("Missing frame count".to_string()))?;
            let num_frames = count_minus_one as usize + 1;

            let (sizes, offset) = match lacing {
                Lacing::Xiph => parse_xiph_lacing(laced, num_frames)?,
                Lacing::Ebml => parse_ebml_lacing(laced, num_frames)?,
                _ => (parse_fixed_lacing(laced.len(), num_frames, strict_fixed)?, 0),
            };
            extract_frames(&laced[offset..], &sizes, lacing != Lacing::Fixed)?
        }
    };

    Ok(Block { header, frames })
}

/// Parse frame sizes from Xiph-style lacing.
///
/// Returns the sizes of all frames except the last, and the lace header length.
fn parse_xiph_lacing(data: &[u8], num_frames: usize) -> Result<(Vec<usize>, usize)> {
    let mut frame_sizes = Vec::with_capacity(num_frames);
    let mut offset = 0;

    for _ in 0..num_frames - 1 {
        let mut size = 0usize;
        loop {
            let byte = *data.get(offset).ok_or_else(|| {
                MkvError::InvalidLacing("Xiph lacing: unexpected end of data".to_string())
            })? as usize;
            offset += 1;
            size += byte;
            if byte < 255 {
                break;
            }
        }
        frame_sizes.push(size);
    }

    Ok((frame_sizes, offset))
}

/// Parse frame sizes from EBML-style lacing.
///
/// The first size is an unsigned VINT; each further size except the last
/// is the previous size plus a signed VINT delta.
fn parse_ebml_lacing(data: &[u8], num_frames: usize) -> Result<(Vec<usize>, usize)> {
    let mut frame_sizes = Vec::with_capacity(num_frames);
    if num_frames == 1 {
        return Ok((frame_sizes, 0));
    }

    let lacing_error =
        |_: MkvError| MkvError::InvalidLacing("EBML lacing: invalid size VINT".to_string());
    let (mut offset, first_size) = ebml::decode_size(data, 0).map_err(lacing_error)?;
    let first_size = usize::try_from(first_size)
        .map_err(|_| MkvError::InvalidLacing("EBML lacing: frame size too large".to_string()))?;
    frame_sizes.push(first_size);

    let mut prev_size = first_size as i64;
    for _ in 1..num_frames - 1 {
        let (width, delta) = ebml::decode_signed(&data[offset..], offset).map_err(lacing_error)?;
        offset += width;
        prev_size = prev_size
            .checked_add(delta)
            .filter(|&size| size >= 0)
            .ok_or_else(|| MkvError::InvalidLacing("EBML lacing: negative frame size".to_string()))?;
        frame_sizes.push(prev_size as usize);
    }

    Ok((frame_sizes, offset))
}

/// Parse frame sizes from fixed-size lacing.
///
/// All frames have equal size, the remaining data divided by the count.
fn parse_fixed_lacing(total_data_size: usize, num_frames: usize, strict: bool) -> Result<Vec<usize>> {
    if strict && total_data_size % num_frames != 0 {
        return Err(MkvError::InvalidLacing(format!(
            "Fixed lacing: data size {} not evenly divisible by {} frames",
            total_data_size, num_frames
        )));
    }
    let frame_size = total_data_size / num_frames;
    Ok(vec![frame_size; num_frames])
}

/// Slice `data` into frames of the given sizes.
///
/// With `last_takes_rest`, one more frame holding the remaining bytes is
/// appended.
fn extract_frames<'a>(data: &'a [u8], sizes: &[usize], last_takes_rest: bool) -> Result<Vec<&'a [u8]>> {
    let mut frames = Vec::with_capacity(sizes.len() + 1);
    let mut offset = 0usize;

    for &size in sizes {
        let end = offset
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                MkvError::InvalidLacing(format!(
                    "Frame size {} exceeds remaining block data {}",
                    size,
                    data.len() - offset
                ))
            })?;
        frames.push(&data[offset..end]);
        offset = end;
    }

    if last_takes_rest {
        frames.push(&data[offset..]);
    }

    Ok(frames)
}

/// Timestamp of the `index`-th frame of a block.
///
/// Frames after the first advance by the track's default duration when one
/// is known.
pub fn frame_timestamp(block_timestamp_ns: i64, index: usize, default_duration_ns: u64) -> i64 {
    if index == 0 || default_duration_ns == 0 {
        return block_timestamp_ns;
    }
    let offset = (index as i64).saturating_mul(i64::try_from(default_duration_ns).unwrap_or(i64::MAX));
    block_timestamp_ns.saturating_add(offset)
}
