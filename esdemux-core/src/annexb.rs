//! Annex-B byte stream helpers for H.264/H.265 output.

/// The four-byte start code prefixed to every emitted NAL unit.
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// Append a start code followed by `nal` to `out`.
pub fn write_nal(out: &mut Vec<u8>, nal: &[u8]) {
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(nal);
}

/// Find the next start code in a byte slice.
///
/// Returns the offset of the start code and its length (3 or 4 bytes).
pub fn find_start_code(data: &[u8]) -> Option<(usize, usize)> {
    let len = data.len();
    if len < 3 {
        return None;
    }

    for i in 0..len - 2 {
        if data[i] == 0 && data[i + 1] == 0 {
            if data[i + 2] == 1 {
                return Some((i, 3));
            } else if i + 3 < len && data[i + 2] == 0 && data[i + 3] == 1 {
                return Some((i, 4));
            }
        }
    }

    None
}

/// Split an Annex-B byte stream into its NAL unit payloads.
///
/// Bytes before the first start code are ignored.
pub fn split_nal_units(data: &[u8]) -> Vec<&[u8]> {
    let mut units = Vec::new();
    let Some((first, first_len)) = find_start_code(data) else {
        return units;
    };

    let mut start = first + first_len;
    while start <= data.len() {
        match find_start_code(&data[start..]) {
            Some((offset, code_len)) => {
                units.push(&data[start..start + offset]);
                start += offset + code_len;
            }
            None => {
                units.push(&data[start..]);
                break;
            }
        }
    }

    units
}
