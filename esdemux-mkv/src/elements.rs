//! Matroska element definitions and codec ID mappings.
//!
//! Only the elements the demuxer interprets are listed; everything else
//! is skipped by its declared size.

use esdemux_core::{Codec, MediaKind};

// =============================================================================
// EBML Header Elements
// =============================================================================

/// EBML Header element.
pub const EBML: u64 = 0x1A45DFA3;
/// Void element (padding).
pub const VOID: u64 = 0xEC;
/// CRC-32 element.
pub const CRC32: u64 = 0xBF;

// =============================================================================
// Segment
// =============================================================================

/// Segment element (top-level container).
pub const SEGMENT: u64 = 0x18538067;
/// Seek Head (index to other top-level elements).
pub const SEEK_HEAD: u64 = 0x114D9B74;
/// Cues (seeking index).
pub const CUES: u64 = 0x1C53BB6B;

// =============================================================================
// Segment Information
// =============================================================================

/// Segment Information.
pub const INFO: u64 = 0x1549A966;
/// Timestamp scale in nanoseconds.
pub const TIMECODE_SCALE: u64 = 0x2AD7B1;
/// Duration of the segment, in timestamp-scale units.
pub const DURATION: u64 = 0x4489;

// =============================================================================
// Tracks
// =============================================================================

/// Tracks container.
pub const TRACKS: u64 = 0x1654AE6B;
/// Track Entry.
pub const TRACK_ENTRY: u64 = 0xAE;
/// Track Number.
pub const TRACK_NUMBER: u64 = 0xD7;
/// Track Type.
pub const TRACK_TYPE: u64 = 0x83;
/// Default Duration (nanoseconds per frame).
pub const DEFAULT_DURATION: u64 = 0x23E383;
/// Codec ID.
pub const CODEC_ID: u64 = 0x86;
/// Codec Private.
pub const CODEC_PRIVATE: u64 = 0x63A2;

/// Video settings.
pub const VIDEO: u64 = 0xE0;
/// Pixel Width.
pub const PIXEL_WIDTH: u64 = 0xB0;
/// Pixel Height.
pub const PIXEL_HEIGHT: u64 = 0xBA;

/// Audio settings.
pub const AUDIO: u64 = 0xE1;
/// Sampling Frequency.
pub const SAMPLING_FREQUENCY: u64 = 0xB5;
/// Channels.
pub const CHANNELS: u64 = 0x9F;

// =============================================================================
// Cluster
// =============================================================================

/// Cluster element.
pub const CLUSTER: u64 = 0x1F43B675;
/// Cluster Timecode.
pub const TIMECODE: u64 = 0xE7;
/// Simple Block.
pub const SIMPLE_BLOCK: u64 = 0xA3;
/// Block Group.
pub const BLOCK_GROUP: u64 = 0xA0;

// =============================================================================
// Track Types
// =============================================================================

/// Track type values.
pub mod track_type {
    /// Video track.
    pub const VIDEO: u64 = 1;
    /// Audio track.
    pub const AUDIO: u64 = 2;
    /// Subtitle track.
    pub const SUBTITLE: u64 = 17;
}

// =============================================================================
// Codec IDs
// =============================================================================

/// Matroska codec ID strings.
pub mod codec_ids {
    /// H.264/AVC video codec.
    pub const V_MPEG4_ISO_AVC: &str = "V_MPEG4/ISO/AVC";
    /// H.265/HEVC video codec.
    pub const V_MPEGH_ISO_HEVC: &str = "V_MPEGH/ISO/HEVC";
    /// AAC audio codec (prefix of every AAC variant).
    pub const A_AAC: &str = "A_AAC";
    /// Opus audio codec.
    pub const A_OPUS: &str = "A_OPUS";
}

/// Map a Matroska codec ID to the elementary codec it carries.
///
/// Matching is by prefix, so `A_AAC/MPEG4/LC` maps to AAC.
pub fn codec_from_mkv_id(codec_id: &str) -> Option<Codec> {
    if codec_id.starts_with(codec_ids::V_MPEG4_ISO_AVC) {
        Some(Codec::H264)
    } else if codec_id.starts_with(codec_ids::V_MPEGH_ISO_HEVC) {
        Some(Codec::H265)
    } else if codec_id.starts_with(codec_ids::A_AAC) {
        Some(Codec::Aac)
    } else if codec_id.starts_with(codec_ids::A_OPUS) {
        Some(Codec::Opus)
    } else {
        None
    }
}

/// Media kind of a Matroska track type value.
pub fn media_kind(track_type: u64) -> Option<MediaKind> {
    match track_type {
        track_type::VIDEO => Some(MediaKind::Video),
        track_type::AUDIO => Some(MediaKind::Audio),
        _ => None,
    }
}

/// Human-readable element name for diagnostics.
pub fn element_name(id: u64) -> &'static str {
    match id {
        EBML => "EBML",
        VOID => "Void",
        CRC32 => "CRC-32",
        SEGMENT => "Segment",
        SEEK_HEAD => "SeekHead",
        CUES => "Cues",
        INFO => "Info",
        TIMECODE_SCALE => "TimecodeScale",
        DURATION => "Duration",
        TRACKS => "Tracks",
        TRACK_ENTRY => "TrackEntry",
        TRACK_NUMBER => "TrackNumber",
        TRACK_TYPE => "TrackType",
        DEFAULT_DURATION => "DefaultDuration",
        CODEC_ID => "CodecID",
        CODEC_PRIVATE => "CodecPrivate",
        VIDEO => "Video",
        PIXEL_WIDTH => "PixelWidth",
        PIXEL_HEIGHT => "PixelHeight",
        AUDIO => "Audio",
        SAMPLING_FREQUENCY => "SamplingFrequency",
        CHANNELS => "Channels",
        CLUSTER => "Cluster",
        TIMECODE => "Timecode",
        SIMPLE_BLOCK => "SimpleBlock",
        BLOCK_GROUP => "BlockGroup",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_mapping() {
        assert_eq!(codec_from_mkv_id("V_MPEG4/ISO/AVC"), Some(Codec::H264));
        assert_eq!(codec_from_mkv_id("V_MPEGH/ISO/HEVC"), Some(Codec::H265));
        assert_eq!(codec_from_mkv_id("A_AAC"), Some(Codec::Aac));
        assert_eq!(codec_from_mkv_id("A_AAC/MPEG4/LC/SBR"), Some(Codec::Aac));
        assert_eq!(codec_from_mkv_id("A_OPUS"), Some(Codec::Opus));
        assert_eq!(codec_from_mkv_id("V_VP9"), None);
        assert_eq!(codec_from_mkv_id("A_VORBIS"), None);
    }

    #[test]
    fn test_media_kind() {
        assert_eq!(media_kind(1), Some(MediaKind::Video));
        assert_eq!(media_kind(2), Some(MediaKind::Audio));
        assert_eq!(media_kind(track_type::SUBTITLE), None);
    }

    #[test]
    fn test_element_name() {
        assert_eq!(element_name(SIMPLE_BLOCK), "SimpleBlock");
        assert_eq!(element_name(0x7373), "Unknown");
    }
}
