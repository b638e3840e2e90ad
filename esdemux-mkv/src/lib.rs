//! # esdemux-mkv
//!
//! Matroska/WebM demuxing into elementary streams.
//!
//! The demuxer walks an in-memory Matroska document and hands each frame to
//! a listener in elementary form:
//! - **H.264 / H.265** - length-prefixed NAL units rewritten to Annex-B, with
//!   parameter sets in front of every keyframe
//! - **AAC** - raw access units prefixed with a 7-byte ADTS header
//! - **Opus** - packets passed through unchanged
//!
//! Laced SimpleBlocks (Xiph, fixed-size and EBML lacing) are split into their
//! frames, each with its own timestamp when the track declares a default
//! duration.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use esdemux_mkv::{DemuxListener, Frame, MkvDemuxer, TrackEvent};
//!
//! struct Printer;
//!
//! impl DemuxListener for Printer {
//!     fn on_track(&self, track: &TrackEvent) {
//!         println!("track {}: {}", track.track_number, track.codec_id);
//!     }
//!
//!     fn on_frame(&self, frame: &Frame<'_>) {
//!         println!(
//!             "track {} at {} ns, {} bytes",
//!             frame.track_number,
//!             frame.timestamp_ns,
//!             frame.payload.len()
//!         );
//!     }
//! }
//!
//! let data = std::fs::read("video.mkv").unwrap();
//! let demuxer = MkvDemuxer::new();
//! demuxer.set_listener(Arc::new(Printer));
//! demuxer.start();
//! demuxer.consume(&data).unwrap();
//! demuxer.stop();
//! ```
//!
//! ## Matroska Element Structure
//!
//! ```text
//! EBML Header
//! Segment
//! ├── Info (TimecodeScale)
//! ├── Tracks
//! │   └── TrackEntry (number, type, codec, Video/Audio)
//! └── Cluster
//!     ├── Timecode
//!     └── SimpleBlock
//! ```

pub mod codec;
pub mod config;
pub mod cursor;
pub mod demuxer;
pub mod ebml;
pub mod elements;
pub mod error;
pub mod info;
pub mod lacing;
pub mod listener;
pub mod stats;
pub mod tracks;
pub mod walker;

pub use codec::{AacConfig, AvcConfig, CodecConfig, HevcConfig};
pub use config::DemuxerConfig;
pub use demuxer::MkvDemuxer;
pub use error::{MkvError, Result};
pub use info::parse_info;
pub use lacing::{Block, BlockFlags, BlockHeader, Lacing};
pub use listener::{DemuxListener, Frame, MkvInfo, TrackEvent};
pub use stats::{keys as stat_keys, Statistics};
pub use tracks::{TrackDescriptor, TrackRegistry, TrackType};

/// Default timecode scale (1 millisecond in nanoseconds).
pub const DEFAULT_TIMECODE_SCALE: u64 = 1_000_000;

/// Check whether a buffer starts with the EBML magic.
pub fn is_mkv_signature(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == [0x1A, 0x45, 0xDF, 0xA3]
}
