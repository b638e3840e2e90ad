//! H.264 `AVCDecoderConfigurationRecord` (avcC) handling.

use super::annexb::{convert_length_prefixed, write_parameter_sets};
use crate::cursor::ElementCursor;
use crate::error::{MkvError, Result};

/// Parameter sets and NAL framing recovered from an avcC record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcConfig {
    /// Width in bytes of each NAL length prefix (1, 2 or 4).
    pub nal_length_size: u8,
    /// Sequence Parameter Sets.
    pub sps: Vec<Vec<u8>>,
    /// Picture Parameter Sets.
    pub pps: Vec<Vec<u8>>,
    /// The record ended before all declared parameter sets were read.
    pub truncated: bool,
}

impl Default for AvcConfig {
    fn default() -> Self {
        Self {
            nal_length_size: 4,
            sps: Vec::new(),
            pps: Vec::new(),
            truncated: false,
        }
    }
}

impl AvcConfig {
    /// Smallest record that carries the NAL length and SPS count fields.
    pub const MIN_SIZE: usize = 7;

    /// Parse from raw codec private bytes.
    ///
    /// Records shorter than [`Self::MIN_SIZE`] are rejected. A record whose
    /// parameter set entries run past the end keeps the complete entries
    /// read so far and sets `truncated`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE {
            return Err(MkvError::malformed(
                "avcC",
                format!("{} bytes, need at least {}", data.len(), Self::MIN_SIZE),
            ));
        }

        let mut config = Self {
            nal_length_size: (data[4] & 0x03) + 1,
            ..Default::default()
        };
        let num_sps = data[5] & 0x1F;

        let mut cur = ElementCursor::new(data);
        cur.skip(6)?;

        let complete = Self::read_sets(&mut cur, num_sps as usize, &mut config.sps).and_then(|()| {
            let num_pps = cur.read_u8()?;
            Self::read_sets(&mut cur, num_pps as usize, &mut config.pps)
        });
        config.truncated = complete.is_err();

        Ok(config)
    }

    fn read_sets(cur: &mut ElementCursor<'_>, count: usize, out: &mut Vec<Vec<u8>>) -> Result<()> {
        for _ in 0..count {
            let len = cur.read_u16_be()? as usize;
            out.push(cur.read_exact(len)?.to_vec());
        }
        Ok(())
    }

    /// Build an avcC record from this configuration.
    pub fn to_record(&self, profile: u8, compat: u8, level: u8) -> Vec<u8> {
        let mut raw = vec![
            1,
            profile,
            compat,
            level,
            0xFC | (self.nal_length_size.saturating_sub(1) & 0x03),
            0xE0 | (self.sps.len() as u8 & 0x1F),
        ];
        for sps in &self.sps {
            raw.extend_from_slice(&(sps.len() as u16).to_be_bytes());
            raw.extend_from_slice(sps);
        }
        raw.push(self.pps.len() as u8);
        for pps in &self.pps {
            raw.extend_from_slice(&(pps.len() as u16).to_be_bytes());
            raw.extend_from_slice(pps);
        }
        raw
    }

    /// Append the Annex-B form of one sample to `out`.
    ///
    /// Keyframes are preceded by every SPS and PPS when
    /// `emit_parameter_sets` is set.
    pub fn write_annex_b(
        &self,
        out: &mut Vec<u8>,
        sample: &[u8],
        keyframe: bool,
        emit_parameter_sets: bool,
    ) {
        if keyframe && emit_parameter_sets {
            write_parameter_sets(out, self.sps.iter().chain(&self.pps));
        }
        convert_length_prefixed(out, sample, self.nal_length_size);
    }
}
