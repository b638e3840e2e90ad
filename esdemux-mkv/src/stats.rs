//! Named session counters.

use std::collections::HashMap;

/// Counter names reported by [`MkvDemuxer::statistics`](crate::MkvDemuxer::statistics).
pub mod keys {
    /// Input bytes handled by successful consume calls.
    pub const BYTES_PROCESSED: &str = "bytes_processed";
    /// Segment children other than Info, Tracks and Cluster.
    pub const ELEMENTS_SKIPPED: &str = "elements_skipped";
    /// Blocks whose track number has no registered track.
    pub const UNKNOWN_TRACK_BLOCKS: &str = "unknown_track_blocks";
    /// Frames of tracks whose codec cannot be converted.
    pub const UNSUPPORTED_CODEC_FRAMES: &str = "unsupported_codec_frames";
    /// Frames delivered to the listener.
    pub const FRAMES_EMITTED: &str = "frames_emitted";
    /// Blocks dropped because their header or lacing was invalid.
    pub const BLOCKS_DROPPED: &str = "blocks_dropped";
    /// Frames dropped because conversion failed.
    pub const FRAMES_DROPPED: &str = "frames_dropped";
    /// BlockGroup elements skipped inside clusters.
    pub const BLOCK_GROUPS_SKIPPED: &str = "block_groups_skipped";
    /// Tracks whose codec private was too short or truncated.
    pub const MALFORMED_CODEC_PRIVATE: &str = "malformed_codec_private";
    /// Child elements whose declared end exceeded their parent.
    pub const ELEMENTS_OUT_OF_BOUNDS: &str = "elements_out_of_bounds";
}

/// Session counters keyed by name.
///
/// Counters that were never incremented are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    counters: HashMap<String, u64>,
}

impl Statistics {
    /// Create an empty counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to a counter.
    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    /// Add `value` to a counter.
    pub fn add(&mut self, key: &str, value: u64) {
        match self.counters.get_mut(key) {
            Some(counter) => *counter = counter.saturating_add(value),
            None => {
                self.counters.insert(key.to_string(), value);
            }
        }
    }

    /// Current value of a counter (0 if never incremented).
    pub fn get(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    /// Copy of all counters.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counters.clone()
    }

    /// Remove every counter.
    pub fn clear(&mut self) {
        self.counters.clear();
    }

    /// Whether no counter has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
