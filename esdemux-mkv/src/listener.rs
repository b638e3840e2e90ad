//! Event types and the listener trait receiving demuxer output.

use crate::tracks::{TrackDescriptor, TrackType};
use std::collections::BTreeMap;

/// Segment information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MkvInfo {
    /// Nanoseconds per timecode unit.
    pub timecode_scale_ns: u64,
    /// Segment duration in seconds, 0.0 when unknown.
    pub duration_seconds: f64,
}

impl Default for MkvInfo {
    fn default() -> Self {
        Self {
            timecode_scale_ns: crate::DEFAULT_TIMECODE_SCALE,
            duration_seconds: 0.0,
        }
    }
}

/// A discovered track as reported to the listener.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackEvent {
    /// Track number.
    pub track_number: u64,
    /// Matroska codec ID.
    pub codec_id: String,
    /// Codec name.
    pub codec_name: String,
    /// "video", "audio" or empty.
    pub track_type: String,
    /// Pixel width (video).
    pub width: u32,
    /// Pixel height (video).
    pub height: u32,
    /// Sample rate in Hz (audio).
    pub sample_rate: u32,
    /// Channel count (audio).
    pub channels: u32,
    /// Raw codec private bytes.
    pub codec_private: Vec<u8>,
    /// Additional string properties.
    pub metadata: BTreeMap<String, String>,
}

impl TrackEvent {
    /// Build the event for a registered track.
    pub fn from_track(track: &TrackDescriptor, timecode_scale_ns: u64) -> Self {
        let tag = track.track_type.tag().unwrap_or_default();
        let mut event = TrackEvent {
            track_number: track.track_number,
            codec_id: track.codec_id.clone(),
            codec_name: track.codec_id.clone(),
            track_type: tag.to_string(),
            codec_private: track.codec_private.clone(),
            ..Default::default()
        };

        match track.track_type {
            TrackType::Video => {
                let video = track.video.clone().unwrap_or_default();
                event.width = video.pixel_width;
                event.height = video.pixel_height;
            }
            TrackType::Audio => {
                let (sample_rate, channels) = track.audio_format();
                event.sample_rate = sample_rate;
                event.channels = channels;
            }
            _ => {}
        }

        if !tag.is_empty() {
            event.metadata.insert("type".to_string(), tag.to_string());
        }
        event
            .metadata
            .insert("timecode_scale_ns".to_string(), timecode_scale_ns.to_string());
        event
    }
}

/// One elementary frame.
///
/// `payload` borrows demuxer memory and is only valid during
/// [`DemuxListener::on_frame`]; copy it to keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Track number.
    pub track_number: u64,
    /// Presentation timestamp in nanoseconds.
    pub timestamp_ns: i64,
    /// Keyframe flag from the block header.
    pub keyframe: bool,
    /// Converted frame bytes.
    pub payload: &'a [u8],
}

/// Receiver of demuxer events.
///
/// Callbacks run synchronously on the thread calling into the demuxer, while
/// its session lock is held. A listener must not call back into the same
/// demuxer.
pub trait DemuxListener: Send + Sync {
    /// Segment information was read.
    fn on_info(&self, _info: &MkvInfo) {}

    /// A track entry was registered.
    fn on_track(&self, _track: &TrackEvent) {}

    /// A frame was demuxed.
    fn on_frame(&self, _frame: &Frame<'_>) {}

    /// The demuxer was stopped.
    fn on_end_of_stream(&self) {}

    /// A consume call failed.
    fn on_error(&self, _code: i32, _message: &str) {}
}
