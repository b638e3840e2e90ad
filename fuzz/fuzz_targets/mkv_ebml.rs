#![no_main]

//! Fuzz target for EBML parsing.
//!
//! Tests VINT decoding, element headers and SimpleBlock lacing with
//! arbitrary input to find parsing bugs and panics.

use arbitrary::Arbitrary;
use esdemux_mkv::cursor::ElementCursor;
use esdemux_mkv::{ebml, lacing, walker};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct EbmlInput {
    data: Vec<u8>,
    operation: EbmlOperation,
}

#[derive(Arbitrary, Debug)]
enum EbmlOperation {
    /// Decode an element ID
    DecodeId,
    /// Decode a size VINT
    DecodeSize,
    /// Decode a signed lacing delta
    DecodeSigned,
    /// Walk element headers until the data runs out
    WalkElements,
    /// Split a SimpleBlock into frames
    ParseBlock { strict_fixed: bool },
    /// Round-trip a size at a given width
    SizeRoundtrip { value: u64, width: u8 },
    /// Round-trip an element ID
    IdRoundtrip { id: u32 },
}

fuzz_target!(|input: EbmlInput| {
    // Limit input size to prevent excessive memory allocation
    if input.data.len() > 64 * 1024 {
        return;
    }

    match input.operation {
        EbmlOperation::DecodeId => {
            if let Ok((width, _)) = ebml::decode_id(&input.data, 0) {
                assert!(width <= input.data.len());
            }
        }

        EbmlOperation::DecodeSize => {
            let _ = ebml::decode_size(&input.data, 0);
        }

        EbmlOperation::DecodeSigned => {
            let _ = ebml::decode_signed(&input.data, 0);
        }

        EbmlOperation::WalkElements => {
            let mut cur = ElementCursor::new(&input.data);
            while let Ok(header) = walker::next_element(&mut cur) {
                if walker::skip_element(&mut cur, &header).is_err() {
                    break;
                }
            }
            assert!(cur.tell() <= input.data.len());
        }

        EbmlOperation::ParseBlock { strict_fixed } => {
            if let Ok(block) = lacing::parse_block(&input.data, strict_fixed) {
                let total: usize = block.frames.iter().map(|f| f.len()).sum();
                assert!(total <= input.data.len(), "frames exceed block data");
            }
        }

        EbmlOperation::SizeRoundtrip { value, width } => {
            let width = (width % 8) as usize + 1;
            if let Some((bytes, len)) = ebml::encode_size_with_width(value, width) {
                let (decoded_width, decoded) = ebml::decode_size(&bytes[..len], 0).unwrap();
                assert_eq!(decoded_width, width, "VINT width mismatch");
                assert_eq!(decoded, value, "VINT round-trip mismatch");
            }
        }

        EbmlOperation::IdRoundtrip { id } => {
            // Force a valid marker bit for a 4-byte ID
            let id = ((id & 0x0FFF_FFFF) | 0x1000_0000) as u64;
            let (bytes, len) = ebml::encode_id(id);
            let (_, decoded) = ebml::decode_id(&bytes[..len], 0).unwrap();
            assert_eq!(decoded, id, "Element ID mismatch");
        }
    }
});
