//! Demuxer benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use esdemux_mkv::ebml::{encode_id, encode_size};
use esdemux_mkv::elements::*;
use esdemux_mkv::lacing::parse_block;
use esdemux_mkv::{DemuxListener, Frame, MkvDemuxer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const SPS: &[u8] = &[0x67, 0x42, 0xC0, 0x1E, 0xD9, 0x00, 0xA0, 0x47, 0xFE, 0xC8];
const PPS: &[u8] = &[0x68, 0xCE, 0x38, 0x80];

#[derive(Default)]
struct ByteCounter {
    bytes: AtomicU64,
}

impl DemuxListener for ByteCounter {
    fn on_frame(&self, frame: &Frame<'_>) {
        self.bytes.fetch_add(frame.payload.len() as u64, Ordering::Relaxed);
    }
}

fn element(id: u64, payload: &[u8]) -> Vec<u8> {
    let (id_bytes, id_len) = encode_id(id);
    let (size_bytes, size_len) = encode_size(payload.len() as u64);
    let mut out = id_bytes[..id_len].to_vec();
    out.extend_from_slice(&size_bytes[..size_len]);
    out.extend_from_slice(payload);
    out
}

fn uint(id: u64, value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = (value.leading_zeros() / 8).min(7) as usize;
    element(id, &bytes[skip..])
}

fn avc_private() -> Vec<u8> {
    let mut cp = vec![0x01, 0x42, 0xC0, 0x1E, 0xFF, 0xE1];
    cp.extend_from_slice(&(SPS.len() as u16).to_be_bytes());
    cp.extend_from_slice(SPS);
    cp.push(0x01);
    cp.extend_from_slice(&(PPS.len() as u16).to_be_bytes());
    cp.extend_from_slice(PPS);
    cp
}

/// H.264 + AAC document with `clusters` clusters of `frames` frames each.
fn generate_document(clusters: usize, frames: usize, frame_size: usize) -> Vec<u8> {
    let video_entry = [
        uint(TRACK_NUMBER, 1),
        uint(TRACK_TYPE, 1),
        element(CODEC_ID, b"V_MPEG4/ISO/AVC"),
        element(CODEC_PRIVATE, &avc_private()),
    ]
    .concat();
    let audio_entry = [
        uint(TRACK_NUMBER, 2),
        uint(TRACK_TYPE, 2),
        element(CODEC_ID, b"A_AAC"),
        element(CODEC_PRIVATE, &[0x12, 0x10]),
    ]
    .concat();
    let tracks = element(
        TRACKS,
        &[element(TRACK_ENTRY, &video_entry), element(TRACK_ENTRY, &audio_entry)].concat(),
    );

    let nal: Vec<u8> = (0..frame_size).map(|i| (i % 251) as u8 | 0x01).collect();
    let mut video_body = (nal.len() as u32 + 1).to_be_bytes().to_vec();
    video_body.push(0x65);
    video_body.extend_from_slice(&nal);

    let mut segment = element(INFO, &uint(TIMECODE_SCALE, 1_000_000));
    segment.extend(tracks);
    for c in 0..clusters {
        let mut children = uint(TIMECODE, (c * frames * 40) as u64);
        for f in 0..frames {
            let track = 1 + (f % 2) as u8;
            let flags = if f == 0 { 0x80 } else { 0x00 };
            let mut block = vec![0x80 | track];
            block.extend_from_slice(&((f * 40) as i16).to_be_bytes());
            block.push(flags);
            if track == 1 {
                block.extend_from_slice(&video_body);
            } else {
                block.extend_from_slice(&nal[..frame_size / 4]);
            }
            children.extend(element(SIMPLE_BLOCK, &block));
        }
        segment.extend(element(CLUSTER, &children));
    }

    let mut data = element(EBML, &element(0x4282, b"matroska"));
    data.extend(element(SEGMENT, &segment));
    data
}

fn bench_consume(c: &mut Criterion) {
    let mut group = c.benchmark_group("mkv_consume");

    for &(clusters, frames) in &[(4usize, 50usize), (32, 100)] {
        let data = generate_document(clusters, frames, 2048);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", clusters, frames)),
            &data,
            |b, data| {
                let demuxer = MkvDemuxer::new();
                let counter = Arc::new(ByteCounter::default());
                demuxer.set_listener(counter.clone());
                b.iter(|| {
                    demuxer.start();
                    let consumed = demuxer.consume(black_box(data)).unwrap();
                    demuxer.stop();
                    black_box(consumed)
                });
            },
        );
    }

    group.finish();
}

fn bench_lacing(c: &mut Criterion) {
    let mut group = c.benchmark_group("lacing");

    for &count in &[8usize, 64] {
        let mut data = vec![0x81, 0x00, 0x00, 0x82, (count - 1) as u8];
        for _ in 0..count - 1 {
            data.extend_from_slice(&[255, 45]);
        }
        data.extend(std::iter::repeat(0xAA).take(300 * count));
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("xiph", count), &data, |b, data| {
            b.iter(|| black_box(parse_block(black_box(data), true).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_consume, bench_lacing);
criterion_main!(benches);
