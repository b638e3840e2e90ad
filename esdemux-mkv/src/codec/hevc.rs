//! H.265 `HEVCDecoderConfigurationRecord` (hvcC) handling.

use super::annexb::{convert_length_prefixed, write_parameter_sets};
use crate::cursor::ElementCursor;
use crate::error::{MkvError, Result};

/// HEVC NAL unit types carried in hvcC arrays.
pub mod nal_type {
    /// Video Parameter Set.
    pub const VPS: u8 = 32;
    /// Sequence Parameter Set.
    pub const SPS: u8 = 33;
    /// Picture Parameter Set.
    pub const PPS: u8 = 34;
}

/// Parameter sets and NAL framing recovered from an hvcC record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HevcConfig {
    /// Width in bytes of each NAL length prefix (1, 2 or 4).
    pub nal_length_size: u8,
    /// Video Parameter Sets.
    pub vps: Vec<Vec<u8>>,
    /// Sequence Parameter Sets.
    pub sps: Vec<Vec<u8>>,
    /// Picture Parameter Sets.
    pub pps: Vec<Vec<u8>>,
    /// The record ended before all declared arrays were read.
    pub truncated: bool,
}

impl Default for HevcConfig {
    fn default() -> Self {
        Self {
            nal_length_size: 4,
            vps: Vec::new(),
            sps: Vec::new(),
            pps: Vec::new(),
            truncated: false,
        }
    }
}

impl HevcConfig {
    /// Size of the fixed part of the record, up to and including the array count.
    pub const MIN_SIZE: usize = 23;

    /// Parse from raw codec private bytes.
    ///
    /// Arrays of NAL types other than VPS/SPS/PPS are read and discarded.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE {
            return Err(MkvError::malformed(
                "hvcC",
                format!("{} bytes, need at least {}", data.len(), Self::MIN_SIZE),
            ));
        }

        let mut config = Self {
            nal_length_size: (data[21] & 0x03) + 1,
            ..Default::default()
        };
        let num_arrays = data[22];

        let mut cur = ElementCursor::new(data);
        cur.skip(Self::MIN_SIZE as u64)?;

        for _ in 0..num_arrays {
            if config.read_array(&mut cur).is_err() {
                config.truncated = true;
                break;
            }
        }

        Ok(config)
    }

    fn read_array(&mut self, cur: &mut ElementCursor<'_>) -> Result<()> {
        if cur.remaining() < 3 {
            return Err(MkvError::malformed("hvcC", "truncated NAL array header"));
        }
        let nal_unit_type = cur.read_u8()? & 0x3F;
        let num_nalus = cur.read_u16_be()?;

        for _ in 0..num_nalus {
            let len = cur.read_u16_be()? as usize;
            let nal = cur.read_exact(len)?.to_vec();
            match nal_unit_type {
                nal_type::VPS => self.vps.push(nal),
                nal_type::SPS => self.sps.push(nal),
                nal_type::PPS => self.pps.push(nal),
                _ => {}
            }
        }
        Ok(())
    }

    /// Build an hvcC record carrying this configuration's parameter sets.
    ///
    /// Profile, tier and level fields are left zero.
    pub fn to_record(&self) -> Vec<u8> {
        let arrays = [
            (nal_type::VPS, &self.vps),
            (nal_type::SPS, &self.sps),
            (nal_type::PPS, &self.pps),
        ];

        let mut raw = vec![0u8; Self::MIN_SIZE];
        raw[0] = 1;
        raw[21] = 0xFC | (self.nal_length_size.saturating_sub(1) & 0x03);
        raw[22] = arrays.iter().filter(|(_, list)| !list.is_empty()).count() as u8;

        for (nal_unit_type, list) in arrays.iter().filter(|(_, list)| !list.is_empty()) {
            raw.push(0x80 | nal_unit_type);
            raw.extend_from_slice(&(list.len() as u16).to_be_bytes());
            for nal in list.iter() {
                raw.extend_from_slice(&(nal.len() as u16).to_be_bytes());
                raw.extend_from_slice(nal);
            }
        }
        raw
    }

    /// Append the Annex-B form of one sample to `out`.
    ///
    /// Keyframes are preceded by every VPS, SPS and PPS, in that order,
    /// when `emit_parameter_sets` is set.
    pub fn write_annex_b(
        &self,
        out: &mut Vec<u8>,
        sample: &[u8],
        keyframe: bool,
        emit_parameter_sets: bool,
    ) {
        if keyframe && emit_parameter_sets {
            write_parameter_sets(out, self.vps.iter().chain(&self.sps).chain(&self.pps));
        }
        convert_length_prefixed(out, sample, self.nal_length_size);
    }
}
