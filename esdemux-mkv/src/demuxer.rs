//! MKV/Matroska elementary-stream demuxer.
//!
//! [`MkvDemuxer`] walks a complete in-memory Matroska document per
//! [`consume`](MkvDemuxer::consume) call and pushes segment info, tracks and
//! converted frames to a [`DemuxListener`] in document order.

use crate::config::DemuxerConfig;
use crate::cursor::ElementCursor;
use crate::ebml::read_unsigned_int;
use crate::elements::{self, element_name};
use crate::error::{MkvError, Result};
use crate::lacing::{frame_timestamp, parse_block};
use crate::listener::{DemuxListener, Frame, MkvInfo, TrackEvent};
use crate::stats::{keys, Statistics};
use crate::tracks::{self, TrackDescriptor, TrackRegistry};
use crate::walker::{for_each_child, locate_segment, read_payload};
use crate::DEFAULT_TIMECODE_SCALE;

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Mutable state of one demuxing session.
struct SessionState {
    running: bool,
    timecode_scale_ns: u64,
    cluster_timecode_ns: i64,
    track_filter: HashSet<u64>,
    tracks: TrackRegistry,
    stats: Statistics,
    listener: Option<Arc<dyn DemuxListener>>,
    /// Reused output buffer for converted frames.
    scratch: Vec<u8>,
}

impl SessionState {
    fn new(config: &DemuxerConfig) -> Self {
        Self {
            running: false,
            timecode_scale_ns: DEFAULT_TIMECODE_SCALE,
            cluster_timecode_ns: 0,
            track_filter: config.track_filter.iter().copied().collect(),
            tracks: TrackRegistry::new(),
            stats: Statistics::new(),
            listener: None,
            scratch: Vec::new(),
        }
    }

    /// Clear tracks, counters and timing. The filter and listener are kept.
    fn reset_session(&mut self) {
        self.tracks.clear();
        self.stats.clear();
        self.timecode_scale_ns = DEFAULT_TIMECODE_SCALE;
        self.cluster_timecode_ns = 0;
    }

    fn stop(&mut self, notify: bool) {
        if !self.running {
            return;
        }
        self.running = false;
        info!("MKV demuxer stopped");
        if notify {
            if let Some(listener) = &self.listener {
                listener.on_end_of_stream();
            }
        }
    }

    fn demux(&mut self, data: &[u8], config: &DemuxerConfig) -> Result<usize> {
        let mut cur = ElementCursor::new(data);
        let segment = locate_segment(&mut cur)?;
        let segment_end = segment
            .end()
            .map_or(data.len(), |end| end.min(data.len()));
        debug!(
            offset = segment.offset,
            size = segment.size,
            end = segment_end,
            "Found segment"
        );

        let containment = config.containment_check;
        for_each_child(&mut cur, segment_end, containment, |cur, child, child_end| {
            match child.id {
                elements::INFO => self.parse_info(cur, child_end, containment),
                elements::TRACKS => self.parse_tracks(cur, child_end, containment),
                elements::CLUSTER => self.parse_cluster(cur, child_end, config),
                id => {
                    self.stats.increment(keys::ELEMENTS_SKIPPED);
                    debug!(id, element = element_name(id), size = child.size, "Skipping element");
                }
            }
            Ok(())
        })?;

        Ok(cur.tell())
    }

    /// Record an error that ended a nested scope early.
    fn scope_failed(&mut self, scope: &'static str, err: &MkvError) {
        if matches!(err, MkvError::ElementOutOfBounds { .. }) {
            self.stats.increment(keys::ELEMENTS_OUT_OF_BOUNDS);
        }
        warn!(scope, error = %err, "Element scope ended early");
    }

    fn parse_info(&mut self, cur: &mut ElementCursor<'_>, end: usize, containment: bool) {
        let mut scale = None;
        let result = for_each_child(cur, end, containment, |cur, child, _| {
            if child.id == elements::TIMECODE_SCALE {
                scale = Some(read_unsigned_int(read_payload(cur, child)?));
            }
            Ok(())
        });

        match scale {
            Some(0) => warn!("Ignoring zero TimecodeScale"),
            Some(scale) => self.timecode_scale_ns = scale,
            None => {}
        }
        if let Err(err) = result {
            self.scope_failed("Info", &err);
        }

        info!(timecode_scale_ns = self.timecode_scale_ns, "Segment info");
        if let Some(listener) = &self.listener {
            listener.on_info(&MkvInfo {
                timecode_scale_ns: self.timecode_scale_ns,
                duration_seconds: 0.0,
            });
        }
    }

    fn parse_tracks(&mut self, cur: &mut ElementCursor<'_>, end: usize, containment: bool) {
        let result = for_each_child(cur, end, containment, |cur, child, child_end| {
            if child.id == elements::TRACK_ENTRY {
                self.register_track(cur, child_end, containment);
            }
            Ok(())
        });
        if let Err(err) = result {
            self.scope_failed("Tracks", &err);
        }
    }

    fn register_track(&mut self, cur: &mut ElementCursor<'_>, end: usize, containment: bool) {
        let mut track = TrackDescriptor::default();
        if let Err(err) = tracks::parse_track_entry(cur, end, containment, &mut track) {
            self.scope_failed("TrackEntry", &err);
        }

        if let Err(err) = track.resolve_codec() {
            self.stats.increment(keys::MALFORMED_CODEC_PRIVATE);
            warn!(
                track = track.track_number,
                codec = %track.codec_id,
                error = %err,
                "Malformed codec private"
            );
        }

        info!(
            track = track.track_number,
            codec = %track.codec_id,
            track_type = ?track.track_type,
            supported = track.codec.is_supported(),
            "Track discovered"
        );

        let event = TrackEvent::from_track(&track, self.timecode_scale_ns);
        if self.tracks.insert(track).is_some() {
            debug!(track = event.track_number, "Replaced track with the same number");
        }
        if let Some(listener) = &self.listener {
            listener.on_track(&event);
        }
    }

    fn parse_cluster(&mut self, cur: &mut ElementCursor<'_>, end: usize, config: &DemuxerConfig) {
        let result = for_each_child(cur, end, config.containment_check, |cur, child, _| {
            match child.id {
                elements::TIMECODE => {
                    let timecode = read_unsigned_int(read_payload(cur, child)?);
                    self.cluster_timecode_ns =
                        clamp_ns(timecode.saturating_mul(self.timecode_scale_ns));
                }
                elements::SIMPLE_BLOCK => {
                    let block = read_payload(cur, child)?;
                    self.process_block(block, config);
                }
                elements::BLOCK_GROUP => {
                    self.stats.increment(keys::BLOCK_GROUPS_SKIPPED);
                    debug!(offset = child.offset, "Skipping BlockGroup");
                }
                _ => {}
            }
            Ok(())
        });
        if let Err(err) = result {
            self.scope_failed("Cluster", &err);
        }
    }

    fn process_block(&mut self, data: &[u8], config: &DemuxerConfig) {
        let block = match parse_block(data, config.strict_fixed_lacing) {
            Ok(block) => block,
            Err(err) => {
                self.stats.increment(keys::BLOCKS_DROPPED);
                warn!(error = %err, "Dropping block");
                return;
            }
        };

        let SessionState {
            timecode_scale_ns,
            cluster_timecode_ns,
            track_filter,
            tracks,
            stats,
            listener,
            scratch,
            ..
        } = self;

        let track_number = block.header.track_number;
        let Some(track) = tracks.get(track_number) else {
            stats.increment(keys::UNKNOWN_TRACK_BLOCKS);
            debug!(track = track_number, "Block for unknown track");
            return;
        };

        let relative_ns = i64::from(block.header.relative_timecode)
            .saturating_mul(clamp_ns(*timecode_scale_ns));
        let block_timestamp_ns = cluster_timecode_ns.saturating_add(relative_ns);
        let keyframe = block.header.is_keyframe();

        for (index, frame) in block.frames.iter().enumerate() {
            if !track.codec.is_supported() {
                stats.increment(keys::UNSUPPORTED_CODEC_FRAMES);
                continue;
            }
            if !track_filter.is_empty() && !track_filter.contains(&track_number) {
                continue;
            }

            let payload =
                match track
                    .codec
                    .convert(frame, keyframe, config.emit_parameter_sets, scratch)
                {
                    Ok(Some(payload)) if !payload.is_empty() => payload,
                    Ok(_) => continue,
                    Err(err) => {
                        stats.increment(keys::FRAMES_DROPPED);
                        warn!(track = track_number, error = %err, "Dropping frame");
                        continue;
                    }
                };

            let timestamp_ns = frame_timestamp(block_timestamp_ns, index, track.default_duration_ns);
            trace!(
                track = track_number,
                timestamp_ns,
                keyframe,
                size = payload.len(),
                "Frame"
            );
            if let Some(listener) = listener.as_ref() {
                listener.on_frame(&Frame {
                    track_number,
                    timestamp_ns,
                    keyframe,
                    payload,
                });
                stats.increment(keys::FRAMES_EMITTED);
            }
        }
    }
}

fn clamp_ns(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Matroska/WebM demuxer producing elementary streams.
///
/// All operations lock one session mutex for their whole duration, so a
/// demuxer can be shared between threads; concurrent calls are serialized.
pub struct MkvDemuxer {
    config: DemuxerConfig,
    state: Mutex<SessionState>,
}

impl MkvDemuxer {
    /// Create a demuxer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DemuxerConfig::default())
    }

    /// Create a demuxer with the given configuration.
    pub fn with_config(config: DemuxerConfig) -> Self {
        let state = Mutex::new(SessionState::new(&config));
        Self { config, state }
    }

    /// The configuration this demuxer was built with.
    pub fn config(&self) -> &DemuxerConfig {
        &self.config
    }

    /// Set the event receiver.
    pub fn set_listener(&self, listener: Arc<dyn DemuxListener>) {
        self.state.lock().listener = Some(listener);
    }

    /// Remove the event receiver.
    pub fn clear_listener(&self) {
        self.state.lock().listener = None;
    }

    /// Only emit frames of the given tracks. An empty set emits all tracks.
    pub fn set_track_filter(&self, tracks: impl IntoIterator<Item = u64>) {
        let filter: HashSet<u64> = tracks.into_iter().collect();
        debug!(tracks = ?filter, "Track filter set");
        self.state.lock().track_filter = filter;
    }

    /// Start a session, clearing tracks and counters.
    ///
    /// Starting a running demuxer only logs a warning.
    pub fn start(&self) -> bool {
        let mut state = self.state.lock();
        if state.running {
            warn!("MKV demuxer already running");
            return true;
        }
        state.running = true;
        state.reset_session();
        info!("MKV demuxer started");
        true
    }

    /// Stop the session, emitting end-of-stream unless disabled in the config.
    pub fn stop(&self) {
        self.state.lock().stop(self.config.notify_end_of_stream);
    }

    /// Whether a session is running.
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Demux one complete Matroska document.
    ///
    /// Returns the offset at which walking the Segment ended. Structural
    /// failures at the Segment level abort the call and are also reported
    /// through [`DemuxListener::on_error`]; problems inside nested elements
    /// are logged, counted and skipped.
    pub fn consume(&self, data: &[u8]) -> Result<usize> {
        let mut state = self.state.lock();
        if !state.running {
            warn!("Consume called while not running");
            return Err(MkvError::NotRunning);
        }

        match state.demux(data, &self.config) {
            Ok(processed) => {
                state.stats.add(keys::BYTES_PROCESSED, processed as u64);
                Ok(processed)
            }
            Err(err) => {
                if matches!(err, MkvError::ElementOutOfBounds { .. }) {
                    state.stats.increment(keys::ELEMENTS_OUT_OF_BOUNDS);
                }
                warn!(code = err.code(), error = %err, "Demux failed");
                if let Some(listener) = &state.listener {
                    listener.on_error(err.code(), &err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Copy of the session counters.
    pub fn statistics(&self) -> HashMap<String, u64> {
        self.state.lock().stats.snapshot()
    }

    /// Clear the session counters.
    pub fn reset_statistics(&self) {
        self.state.lock().stats.clear();
    }

    /// Clear tracks, counters and timing without changing the running state.
    pub fn reset(&self) {
        self.state.lock().reset_session();
    }

    /// A registered track.
    pub fn track(&self, track_number: u64) -> Option<TrackDescriptor> {
        self.state.lock().tracks.get(track_number).cloned()
    }

    /// Number of registered tracks.
    pub fn track_count(&self) -> usize {
        self.state.lock().tracks.len()
    }

    /// Current timecode scale in nanoseconds.
    pub fn timecode_scale_ns(&self) -> u64 {
        self.state.lock().timecode_scale_ns
    }
}

impl Default for MkvDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MkvDemuxer {
    fn drop(&mut self) {
        self.state.get_mut().stop(false);
    }
}

impl std::fmt::Debug for MkvDemuxer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MkvDemuxer")
            .field("config", &self.config)
            .field("running", &state.running)
            .field("tracks", &state.tracks.len())
            .field("timecode_scale_ns", &state.timecode_scale_ns)
            .finish()
    }
}
