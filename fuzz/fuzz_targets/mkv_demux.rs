#![no_main]

use esdemux_mkv::{parse_info, DemuxListener, DemuxerConfig, Frame, MkvDemuxer, TrackEvent};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

struct Sink;

impl DemuxListener for Sink {
    fn on_track(&self, track: &TrackEvent) {
        let _ = track.metadata.len();
    }

    fn on_frame(&self, frame: &Frame<'_>) {
        let _ = frame.payload.iter().fold(0u8, |acc, b| acc ^ b);
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    // Info probe must not panic
    let _ = parse_info(data);

    // Run the full demuxer with both containment settings
    for containment in [true, false] {
        let config = DemuxerConfig::new()
            .with_containment_check(containment)
            .with_strict_fixed_lacing(containment);
        let demuxer = MkvDemuxer::with_config(config);
        demuxer.set_listener(Arc::new(Sink));
        demuxer.start();

        if let Ok(consumed) = demuxer.consume(data) {
            assert!(consumed <= data.len());
        }
        let _ = demuxer.statistics();
        demuxer.stop();
    }
});
