//! Synthetic Matroska builders and a recording listener shared by the
//! integration tests.

#![allow(dead_code)]

use esdemux_mkv::ebml::{encode_id, encode_size};
use esdemux_mkv::elements::*;
use esdemux_mkv::{DemuxListener, Frame, MkvInfo, TrackEvent};
use parking_lot::Mutex;

/// DocType inside the EBML header.
const DOC_TYPE: u64 = 0x4282;

/// Install a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// EBML builders
// =============================================================================

pub fn element(id: u64, payload: &[u8]) -> Vec<u8> {
    let (id_bytes, id_len) = encode_id(id);
    let (size_bytes, size_len) = encode_size(payload.len() as u64);
    let mut out = Vec::with_capacity(id_len + size_len + payload.len());
    out.extend_from_slice(&id_bytes[..id_len]);
    out.extend_from_slice(&size_bytes[..size_len]);
    out.extend_from_slice(payload);
    out
}

/// Element with an explicit, possibly wrong, declared size.
pub fn element_with_size(id: u64, declared: u64, payload: &[u8]) -> Vec<u8> {
    let (id_bytes, id_len) = encode_id(id);
    let (size_bytes, size_len) = encode_size(declared);
    let mut out = id_bytes[..id_len].to_vec();
    out.extend_from_slice(&size_bytes[..size_len]);
    out.extend_from_slice(payload);
    out
}

pub fn master(id: u64, children: &[Vec<u8>]) -> Vec<u8> {
    element(id, &children.concat())
}

pub fn uint(id: u64, value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = (value.leading_zeros() / 8).min(7) as usize;
    element(id, &bytes[skip..])
}

pub fn float(id: u64, value: f64) -> Vec<u8> {
    element(id, &value.to_be_bytes())
}

pub fn float32(id: u64, value: f32) -> Vec<u8> {
    element(id, &value.to_be_bytes())
}

pub fn string(id: u64, value: &str) -> Vec<u8> {
    element(id, value.as_bytes())
}

pub fn ebml_header() -> Vec<u8> {
    master(EBML, &[string(DOC_TYPE, "matroska")])
}

pub fn segment(children: &[Vec<u8>]) -> Vec<u8> {
    master(SEGMENT, children)
}

/// EBML header followed by a Segment holding `children`.
pub fn document(children: &[Vec<u8>]) -> Vec<u8> {
    let mut data = ebml_header();
    data.extend(segment(children));
    data
}

pub fn info(timecode_scale: u64) -> Vec<u8> {
    master(INFO, &[uint(TIMECODE_SCALE, timecode_scale)])
}

pub fn tracks(entries: &[Vec<u8>]) -> Vec<u8> {
    master(TRACKS, entries)
}

/// TrackEntry with the common fields plus any extra children.
pub fn track_entry(
    number: u64,
    track_type: u64,
    codec_id: &str,
    codec_private: Option<&[u8]>,
    extra: &[Vec<u8>],
) -> Vec<u8> {
    let mut children = vec![
        uint(TRACK_NUMBER, number),
        uint(TRACK_TYPE, track_type),
        string(CODEC_ID, codec_id),
    ];
    if let Some(cp) = codec_private {
        children.push(element(CODEC_PRIVATE, cp));
    }
    children.extend_from_slice(extra);
    master(TRACK_ENTRY, &children)
}

pub fn video(width: u64, height: u64) -> Vec<u8> {
    master(VIDEO, &[uint(PIXEL_WIDTH, width), uint(PIXEL_HEIGHT, height)])
}

pub fn audio(sampling_frequency: f64, channels: u64) -> Vec<u8> {
    master(
        AUDIO,
        &[float(SAMPLING_FREQUENCY, sampling_frequency), uint(CHANNELS, channels)],
    )
}

pub fn cluster(timecode: u64, blocks: &[Vec<u8>]) -> Vec<u8> {
    let mut children = vec![uint(TIMECODE, timecode)];
    children.extend_from_slice(blocks);
    master(CLUSTER, &children)
}

/// SimpleBlock payload: track VINT, relative timecode, flags, then `body`.
pub fn block_payload(track: u64, relative_timecode: i16, flags: u8, body: &[u8]) -> Vec<u8> {
    let (track_bytes, track_len) = encode_size(track);
    let mut payload = track_bytes[..track_len].to_vec();
    payload.extend_from_slice(&relative_timecode.to_be_bytes());
    payload.push(flags);
    payload.extend_from_slice(body);
    payload
}

pub fn simple_block(track: u64, relative_timecode: i16, flags: u8, body: &[u8]) -> Vec<u8> {
    element(SIMPLE_BLOCK, &block_payload(track, relative_timecode, flags, body))
}

/// Length-prefix each NAL unit with a 4-byte big-endian size.
pub fn length_prefixed(nals: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for nal in nals {
        out.extend_from_slice(&(nal.len() as u32).to_be_bytes());
        out.extend_from_slice(nal);
    }
    out
}

// =============================================================================
// Recording listener
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub track_number: u64,
    pub timestamp_ns: i64,
    pub keyframe: bool,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Info(MkvInfo),
    Track(TrackEvent),
    Frame(RecordedFrame),
    EndOfStream,
    Error(i32, String),
}

#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn infos(&self) -> Vec<MkvInfo> {
        self.filter(|e| match e {
            Event::Info(info) => Some(*info),
            _ => None,
        })
    }

    pub fn tracks(&self) -> Vec<TrackEvent> {
        self.filter(|e| match e {
            Event::Track(track) => Some(track.clone()),
            _ => None,
        })
    }

    pub fn frames(&self) -> Vec<RecordedFrame> {
        self.filter(|e| match e {
            Event::Frame(frame) => Some(frame.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<(i32, String)> {
        self.filter(|e| match e {
            Event::Error(code, message) => Some((*code, message.clone())),
            _ => None,
        })
    }

    pub fn end_of_stream_count(&self) -> usize {
        self.filter(|e| matches!(e, Event::EndOfStream).then_some(())).len()
    }

    fn filter<T>(&self, f: impl Fn(&Event) -> Option<T>) -> Vec<T> {
        self.events.lock().iter().filter_map(f).collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

impl DemuxListener for Recorder {
    fn on_info(&self, info: &MkvInfo) {
        self.push(Event::Info(*info));
    }

    fn on_track(&self, track: &TrackEvent) {
        self.push(Event::Track(track.clone()));
    }

    fn on_frame(&self, frame: &Frame<'_>) {
        self.push(Event::Frame(RecordedFrame {
            track_number: frame.track_number,
            timestamp_ns: frame.timestamp_ns,
            keyframe: frame.keyframe,
            payload: frame.payload.to_vec(),
        }));
    }

    fn on_end_of_stream(&self) {
        self.push(Event::EndOfStream);
    }

    fn on_error(&self, code: i32, message: &str) {
        self.push(Event::Error(code, message.to_string()));
    }
}
