//! Elementary stream codecs.

use std::fmt;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Codecs the demuxers can turn into standalone elementary streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// H.264/AVC, emitted as Annex-B.
    H264,
    /// H.265/HEVC, emitted as Annex-B.
    H265,
    /// AAC, emitted as ADTS frames.
    Aac,
    /// Opus, emitted as raw packets.
    Opus,
}

impl Codec {
    /// Get the media kind of this codec.
    pub fn kind(&self) -> MediaKind {
        match self {
            Codec::H264 | Codec::H265 => MediaKind::Video,
            Codec::Aac | Codec::Opus => MediaKind::Audio,
        }
    }

    /// Get the codec name.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::H264 => "H.264/AVC",
            Codec::H265 => "H.265/HEVC",
            Codec::Aac => "AAC",
            Codec::Opus => "Opus",
        }
    }

    /// File extension conventionally used for this elementary stream.
    pub fn elementary_extension(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::H265 => "h265",
            Codec::Aac => "aac",
            Codec::Opus => "opus",
        }
    }

    /// Whether emitted frames are NAL units in Annex-B framing.
    pub fn is_annex_b(&self) -> bool {
        matches!(self, Codec::H264 | Codec::H265)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
