//! Length-prefixed to Annex-B NAL conversion shared by AVC and HEVC tracks.

use esdemux_core::annexb::write_nal;

/// Append each parameter set with a start code.
pub fn write_parameter_sets<'p, I>(out: &mut Vec<u8>, sets: I)
where
    I: IntoIterator<Item = &'p Vec<u8>>,
{
    for set in sets {
        write_nal(out, set);
    }
}

/// Rewrite a sample of length-prefixed NAL units as start-code framed units.
///
/// The length prefix is big-endian and `nal_length_size` bytes wide. Only
/// widths 1, 2 and 4 are defined; any other width converts nothing. A unit
/// whose declared length overruns the sample ends the conversion, keeping
/// the units already written. Returns the number of units written.
pub fn convert_length_prefixed(out: &mut Vec<u8>, sample: &[u8], nal_length_size: u8) -> usize {
    let width = nal_length_size as usize;
    if !matches!(width, 1 | 2 | 4) {
        return 0;
    }

    let mut count = 0;
    let mut offset = 0;
    while offset + width <= sample.len() {
        let len = sample[offset..offset + width]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        offset += width;

        let Some(end) = offset.checked_add(len).filter(|&end| end <= sample.len()) else {
            break;
        };
        write_nal(out, &sample[offset..end]);
        offset = end;
        count += 1;
    }

    count
}
