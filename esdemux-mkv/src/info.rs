//! Lightweight segment information probe.
//!
//! Reads only the EBML header, the Segment header and the first Info
//! element. No demuxer session is involved.

use crate::cursor::ElementCursor;
use crate::ebml::{read_float, read_unsigned_int};
use crate::elements;
use crate::error::{MkvError, Result};
use crate::listener::MkvInfo;
use crate::walker::{for_each_child, next_element, read_payload, skip_element};
use tracing::{debug, warn};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Read the timecode scale and duration of a Matroska document.
///
/// The buffer must start with the EBML header, directly followed by the
/// Segment. A missing Info element yields the defaults. Duration is
/// converted from timecode units to seconds.
pub fn parse_info(data: &[u8]) -> Result<MkvInfo> {
    let mut cur = ElementCursor::new(data);

    let header = next_element(&mut cur).map_err(|e| MkvError::InvalidEbmlHeader(e.to_string()))?;
    if header.id != elements::EBML {
        return Err(MkvError::InvalidEbmlHeader(format!(
            "expected EBML header, found element {:#X}",
            header.id
        )));
    }
    skip_element(&mut cur, &header)?;

    let segment = next_element(&mut cur)?;
    if segment.id != elements::SEGMENT {
        return Err(MkvError::SegmentNotFound);
    }
    let segment_end = segment
        .end()
        .map_or(data.len(), |end| end.min(data.len()));

    let mut info = MkvInfo::default();
    let mut duration = None;

    while cur.tell() < segment_end {
        let child = match next_element(&mut cur) {
            Ok(child) => child,
            Err(err) => {
                warn!(error = %err, "Stopped scanning segment");
                break;
            }
        };

        if child.id == elements::INFO {
            let end = child.end()?.min(segment_end);
            let result = for_each_child(&mut cur, end, true, |cur, field, _| {
                match field.id {
                    elements::TIMECODE_SCALE => {
                        let scale = read_unsigned_int(read_payload(cur, field)?);
                        if scale > 0 {
                            info.timecode_scale_ns = scale;
                        }
                    }
                    elements::DURATION => duration = read_float(read_payload(cur, field)?),
                    _ => {}
                }
                Ok(())
            });
            if let Err(err) = result {
                warn!(error = %err, "Info element ended early");
            }
            break;
        }

        debug!(id = child.id, element = elements::element_name(child.id), "Skipping element");
        if skip_element(&mut cur, &child).is_err() {
            break;
        }
    }

    if let Some(units) = duration {
        info.duration_seconds = units * info.timecode_scale_ns as f64 / NANOS_PER_SECOND;
    }
    debug!(
        timecode_scale_ns = info.timecode_scale_ns,
        duration_seconds = info.duration_seconds,
        "Parsed segment info"
    );
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EBML_HEADER: [u8; 5] = [0x1A, 0x45, 0xDF, 0xA3, 0x80];

    fn document(segment_payload: &[u8]) -> Vec<u8> {
        let mut data = EBML_HEADER.to_vec();
        data.extend_from_slice(&[0x18, 0x53, 0x80, 0x67]);
        data.push(0x80 | segment_payload.len() as u8);
        data.extend_from_slice(segment_payload);
        data
    }

    #[test]
    fn test_scale_and_duration() {
        let segment = [
            0xEC, 0x81, 0x00, // Void
            0x15, 0x49, 0xA9, 0x66, 0x8E, // Info, 14 bytes
            0x2A, 0xD7, 0xB1, 0x83, 0x0F, 0x42, 0x40, // TimecodeScale = 1_000_000
            0x44, 0x89, 0x84, 0x45, 0x9C, 0x40, 0x00, // Duration = 5000.0 (f32)
        ];
        let info = parse_info(&document(&segment)).unwrap();
        assert_eq!(info.timecode_scale_ns, 1_000_000);
        assert!((info.duration_seconds - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_info_uses_defaults() {
        let info = parse_info(&document(&[0xEC, 0x80])).unwrap();
        assert_eq!(info, MkvInfo::default());
    }

    #[test]
    fn test_requires_ebml_header() {
        let data = [0x18, 0x53, 0x80, 0x67, 0x80];
        assert!(matches!(
            parse_info(&data),
            Err(MkvError::InvalidEbmlHeader(_))
        ));
        assert!(matches!(
            parse_info(&[]),
            Err(MkvError::InvalidEbmlHeader(_))
        ));
    }

    #[test]
    fn test_requires_segment_after_header() {
        let mut data = EBML_HEADER.to_vec();
        data.extend_from_slice(&[0xEC, 0x80]);
        assert!(matches!(parse_info(&data), Err(MkvError::SegmentNotFound)));
    }
}
