//! Per-codec configuration records and frame conversion into elementary
//! stream framing.
//!
//! - H.264/H.265: length-prefixed NAL units become Annex-B, with parameter
//!   sets prepended on keyframes
//! - AAC: raw access units get an ADTS header
//! - Opus: packets pass through unchanged

pub mod aac;
pub mod annexb;
pub mod avc;
pub mod hevc;

pub use aac::AacConfig;
pub use avc::AvcConfig;
pub use hevc::HevcConfig;

use crate::error::Result;
use esdemux_core::Codec;

/// Conversion state attached to a registered track.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecConfig {
    /// H.264 with its avcC parameter sets.
    Avc(AvcConfig),
    /// H.265 with its hvcC parameter sets.
    Hevc(HevcConfig),
    /// AAC with the fields needed for ADTS.
    Aac(AacConfig),
    /// Opus, no state.
    Opus,
    /// Anything else; frames are dropped.
    Unsupported,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig::Unsupported
    }
}

impl CodecConfig {
    /// The elementary codec, or `None` for unsupported tracks.
    pub fn codec(&self) -> Option<Codec> {
        match self {
            CodecConfig::Avc(_) => Some(Codec::H264),
            CodecConfig::Hevc(_) => Some(Codec::H265),
            CodecConfig::Aac(_) => Some(Codec::Aac),
            CodecConfig::Opus => Some(Codec::Opus),
            CodecConfig::Unsupported => None,
        }
    }

    /// Whether frames of this track can be converted.
    pub fn is_supported(&self) -> bool {
        !matches!(self, CodecConfig::Unsupported)
    }

    /// Convert one de-laced frame into its elementary form.
    ///
    /// Converted output is built in `scratch`, which is cleared first; Opus
    /// frames are returned as-is. Unsupported tracks yield `Ok(None)`.
    pub fn convert<'f>(
        &self,
        frame: &'f [u8],
        keyframe: bool,
        emit_parameter_sets: bool,
        scratch: &'f mut Vec<u8>,
    ) -> Result<Option<&'f [u8]>> {
        scratch.clear();
        match self {
            CodecConfig::Avc(config) => {
                config.write_annex_b(scratch, frame, keyframe, emit_parameter_sets)
            }
            CodecConfig::Hevc(config) => {
                config.write_annex_b(scratch, frame, keyframe, emit_parameter_sets)
            }
            CodecConfig::Aac(config) => config.write_adts_frame(scratch, frame)?,
            CodecConfig::Opus => return Ok(Some(frame)),
            CodecConfig::Unsupported => return Ok(None),
        }
        Ok(Some(scratch.as_slice()))
    }
}
