//! Track descriptors and the per-session track registry.

use crate::codec::{AacConfig, AvcConfig, CodecConfig, HevcConfig};
use crate::cursor::ElementCursor;
use crate::ebml::{read_float, read_string, read_unsigned_int};
use crate::elements::{self, codec_from_mkv_id, media_kind};
use crate::error::{MkvError, Result};
use crate::walker::{for_each_child, read_payload, ElementHeader};
use esdemux_core::{Codec, MediaKind};
use std::collections::HashMap;

/// Track type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackType {
    /// Video track.
    Video,
    /// Audio track.
    Audio,
    /// Any other or missing type value.
    #[default]
    Unknown,
    /// A type value the demuxer does not handle.
    Other(u64),
}

impl TrackType {
    /// Map a Matroska TrackType value.
    pub fn from_raw(value: u64) -> Self {
        match media_kind(value) {
            Some(MediaKind::Video) => TrackType::Video,
            Some(MediaKind::Audio) => TrackType::Audio,
            None => TrackType::Other(value),
        }
    }

    /// Media kind, if video or audio.
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            TrackType::Video => Some(MediaKind::Video),
            TrackType::Audio => Some(MediaKind::Audio),
            _ => None,
        }
    }

    /// Tag used in track event metadata.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            TrackType::Video => Some("video"),
            TrackType::Audio => Some("audio"),
            _ => None,
        }
    }
}

/// Values from a track's Video element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSettings {
    /// Pixel width.
    pub pixel_width: u32,
    /// Pixel height.
    pub pixel_height: u32,
}

/// Values from a track's Audio element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioSettings {
    /// Sampling frequency in Hz.
    pub sampling_frequency: Option<f64>,
    /// Channel count.
    pub channels: Option<u64>,
}

/// A track as declared by one TrackEntry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDescriptor {
    /// Track number used by blocks.
    pub track_number: u64,
    /// Track type.
    pub track_type: TrackType,
    /// Codec ID string.
    pub codec_id: String,
    /// Raw codec private bytes.
    pub codec_private: Vec<u8>,
    /// Default frame duration in nanoseconds, 0 if not declared.
    pub default_duration_ns: u64,
    /// Video element values.
    pub video: Option<VideoSettings>,
    /// Audio element values.
    pub audio: Option<AudioSettings>,
    /// Conversion state derived from the codec ID and codec private.
    pub codec: CodecConfig,
}

impl TrackDescriptor {
    /// Derive the conversion state from the codec ID and codec private.
    ///
    /// The codec must match the track type; an AVC codec ID on an audio
    /// track is unsupported. A too-short or truncated configuration record
    /// still yields a usable state (defaults, or the sets read so far) and
    /// the problem is returned as an error for reporting.
    pub fn resolve_codec(&mut self) -> Result<()> {
        let codec = match codec_from_mkv_id(&self.codec_id) {
            Some(codec) if Some(codec.kind()) == self.track_type.kind() => codec,
            _ => {
                self.codec = CodecConfig::Unsupported;
                return Ok(());
            }
        };

        let (config, problem) = match codec {
            Codec::H264 => match AvcConfig::parse(&self.codec_private) {
                Ok(avc) if avc.truncated => (
                    CodecConfig::Avc(avc),
                    Some(MkvError::malformed("avcC", "parameter sets truncated")),
                ),
                Ok(avc) => (CodecConfig::Avc(avc), None),
                Err(e) => (CodecConfig::Avc(AvcConfig::default()), Some(e)),
            },
            Codec::H265 => match HevcConfig::parse(&self.codec_private) {
                Ok(hevc) if hevc.truncated => (
                    CodecConfig::Hevc(hevc),
                    Some(MkvError::malformed("hvcC", "NAL arrays truncated")),
                ),
                Ok(hevc) => (CodecConfig::Hevc(hevc), None),
                Err(e) => (CodecConfig::Hevc(HevcConfig::default()), Some(e)),
            },
            Codec::Aac => {
                let from_audio = self.audio_defaults();
                if self.codec_private.is_empty() {
                    (CodecConfig::Aac(from_audio), None)
                } else {
                    match AacConfig::parse(&self.codec_private) {
                        Ok(aac) => (CodecConfig::Aac(aac), None),
                        Err(e) => (CodecConfig::Aac(from_audio), Some(e)),
                    }
                }
            }
            Codec::Opus => (CodecConfig::Opus, None),
        };

        self.codec = config;
        problem.map_or(Ok(()), Err)
    }

    fn audio_defaults(&self) -> AacConfig {
        let audio = self.audio.clone().unwrap_or_default();
        AacConfig::from_audio_settings(audio.sampling_frequency, audio.channels)
    }

    /// The elementary codec produced for this track.
    pub fn elementary_codec(&self) -> Option<Codec> {
        self.codec.codec()
    }

    /// Reported sample rate and channel count.
    ///
    /// AAC tracks report their AudioSpecificConfig values; other tracks the
    /// Audio element values, falling back to 44.1 kHz stereo.
    pub fn audio_format(&self) -> (u32, u32) {
        let aac = match &self.codec {
            CodecConfig::Aac(aac) => *aac,
            _ => self.audio_defaults(),
        };
        (aac.sample_rate, aac.channel_config as u32)
    }
}

/// Parse the children of a TrackEntry into `track`.
///
/// Fields read before an error are kept.
pub fn parse_track_entry(
    cur: &mut ElementCursor<'_>,
    end: usize,
    containment: bool,
    track: &mut TrackDescriptor,
) -> Result<()> {
    for_each_child(cur, end, containment, |cur, child, child_end| {
        match child.id {
            elements::TRACK_NUMBER => {
                track.track_number = read_unsigned_int(read_payload(cur, child)?);
            }
            elements::TRACK_TYPE => {
                track.track_type = TrackType::from_raw(read_unsigned_int(read_payload(cur, child)?));
            }
            elements::CODEC_ID => {
                track.codec_id = read_string(read_payload(cur, child)?);
            }
            elements::CODEC_PRIVATE => {
                track.codec_private = read_payload(cur, child)?.to_vec();
            }
            elements::DEFAULT_DURATION => {
                track.default_duration_ns = read_unsigned_int(read_payload(cur, child)?);
            }
            elements::VIDEO => {
                let video = track.video.get_or_insert_with(VideoSettings::default);
                parse_video_settings(cur, child_end, containment, video)?;
            }
            elements::AUDIO => {
                let audio = track.audio.get_or_insert_with(AudioSettings::default);
                parse_audio_settings(cur, child_end, containment, audio)?;
            }
            _ => {}
        }
        Ok(())
    })
}

fn parse_video_settings(
    cur: &mut ElementCursor<'_>,
    end: usize,
    containment: bool,
    video: &mut VideoSettings,
) -> Result<()> {
    for_each_child(cur, end, containment, |cur, child, _| {
        match child.id {
            elements::PIXEL_WIDTH => video.pixel_width = read_dimension(cur, child)?,
            elements::PIXEL_HEIGHT => video.pixel_height = read_dimension(cur, child)?,
            _ => {}
        }
        Ok(())
    })
}

fn read_dimension(cur: &mut ElementCursor<'_>, child: &ElementHeader) -> Result<u32> {
    let value = read_unsigned_int(read_payload(cur, child)?);
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

fn parse_audio_settings(
    cur: &mut ElementCursor<'_>,
    end: usize,
    containment: bool,
    audio: &mut AudioSettings,
) -> Result<()> {
    for_each_child(cur, end, containment, |cur, child, _| {
        match child.id {
            elements::SAMPLING_FREQUENCY => {
                audio.sampling_frequency = read_float(read_payload(cur, child)?);
            }
            elements::CHANNELS => {
                audio.channels = Some(read_unsigned_int(read_payload(cur, child)?));
            }
            _ => {}
        }
        Ok(())
    })
}

/// Tracks registered in the current session, keyed by track number.
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    tracks: HashMap<u64, TrackDescriptor>,
}

impl TrackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a track, replacing any previous track with the same number.
    pub fn insert(&mut self, track: TrackDescriptor) -> Option<TrackDescriptor> {
        self.tracks.insert(track.track_number, track)
    }

    /// Look up a track.
    pub fn get(&self, track_number: u64) -> Option<&TrackDescriptor> {
        self.tracks.get(&track_number)
    }

    /// Number of registered tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no track is registered.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Remove every track.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Iterate over registered tracks in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.values()
    }
}
