#![no_main]

//! Fuzz target for codec private records.
//!
//! Parses avcC, hvcC and AudioSpecificConfig data, then converts an
//! arbitrary sample with whatever parsed.

use arbitrary::Arbitrary;
use esdemux_core::annexb::split_nal_units;
use esdemux_mkv::{AacConfig, AvcConfig, CodecConfig, HevcConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct PrivateInput {
    record: Vec<u8>,
    sample: Vec<u8>,
    keyframe: bool,
    kind: RecordKind,
}

#[derive(Arbitrary, Debug)]
enum RecordKind {
    Avc,
    Hevc,
    Aac,
}

fuzz_target!(|input: PrivateInput| {
    if input.record.len() > 16 * 1024 || input.sample.len() > 64 * 1024 {
        return;
    }

    let config = match input.kind {
        RecordKind::Avc => AvcConfig::parse(&input.record).map(CodecConfig::Avc),
        RecordKind::Hevc => HevcConfig::parse(&input.record).map(CodecConfig::Hevc),
        RecordKind::Aac => AacConfig::parse(&input.record).map(CodecConfig::Aac),
    };

    if let Ok(config) = config {
        let mut scratch = Vec::new();
        if let Ok(Some(out)) = config.convert(&input.sample, input.keyframe, true, &mut scratch) {
            if matches!(config, CodecConfig::Avc(_) | CodecConfig::Hevc(_)) {
                // Annex-B output must split back cleanly
                let _ = split_nal_units(out);
            }
        }
    }
});
