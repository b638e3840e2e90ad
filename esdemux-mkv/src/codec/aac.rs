//! AAC AudioSpecificConfig parsing and ADTS header synthesis.

use crate::error::{MkvError, Result};
use esdemux_core::error::BitstreamError;
use esdemux_core::{BitReader, BitWriter};

/// Sampling frequencies indexed by `sampling_frequency_index`.
pub const SAMPLE_RATES: [u32; 16] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350, 0, 0,
    0,
];

/// ADTS header size without CRC.
pub const ADTS_HEADER_SIZE: usize = 7;

/// Largest value of the 13-bit ADTS frame length field.
pub const MAX_ADTS_FRAME_LENGTH: usize = 0x1FFF;

/// Sample rate for a sampling frequency index (0 for reserved indices).
pub fn sample_rate_for_index(index: u8) -> u32 {
    SAMPLE_RATES.get(index as usize).copied().unwrap_or(0)
}

/// Sampling frequency index for an exact sample rate.
pub fn index_for_sample_rate(rate: u32) -> Option<u8> {
    if rate == 0 {
        return None;
    }
    SAMPLE_RATES.iter().position(|&r| r == rate).map(|i| i as u8)
}

/// AAC stream parameters needed to frame raw access units as ADTS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AacConfig {
    /// Audio object type (2 = AAC LC).
    pub object_type: u8,
    /// Sampling frequency index into [`SAMPLE_RATES`].
    pub sampling_frequency_index: u8,
    /// Channel configuration.
    pub channel_config: u8,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for AacConfig {
    fn default() -> Self {
        Self {
            object_type: 2,
            sampling_frequency_index: 4,
            channel_config: 2,
            sample_rate: 44100,
        }
    }
}

impl AacConfig {
    /// Start from defaults, then apply the Matroska Audio element values.
    ///
    /// The sampling frequency is rounded to the nearest integer; the index
    /// only changes if that rate appears in [`SAMPLE_RATES`].
    pub fn from_audio_settings(sampling_frequency: Option<f64>, channels: Option<u64>) -> Self {
        let mut config = Self::default();
        if let Some(freq) = sampling_frequency {
            config.sample_rate = (freq + 0.5) as u32;
            if let Some(index) = index_for_sample_rate(config.sample_rate) {
                config.sampling_frequency_index = index;
            }
        }
        if let Some(channels) = channels {
            config.channel_config = (channels & 0xFF) as u8;
        }
        config
    }

    /// Parse the leading fields of an AudioSpecificConfig.
    ///
    /// A single-byte config is read with an implied zero second byte.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let Some(&first) = data.first() else {
            return Err(MkvError::malformed(
                "AudioSpecificConfig",
                "empty codec private",
            ));
        };
        let head = [first, data.get(1).copied().unwrap_or(0)];

        let mut reader = BitReader::new(&head);
        let object_type = reader.read_bits(5)? as u8;
        let sampling_frequency_index = reader.read_bits(4)? as u8;
        let channel_config = reader.read_bits(4)? as u8;

        Ok(Self {
            object_type,
            sampling_frequency_index,
            channel_config,
            sample_rate: sample_rate_for_index(sampling_frequency_index),
        })
    }

    /// ADTS profile (object type minus one).
    pub fn profile(&self) -> u8 {
        self.object_type.wrapping_sub(1)
    }

    /// Build the 7-byte ADTS header for a raw frame of `payload_len` bytes.
    pub fn adts_header(&self, payload_len: usize) -> Result<[u8; ADTS_HEADER_SIZE]> {
        let frame_length = payload_len + ADTS_HEADER_SIZE;
        if frame_length > MAX_ADTS_FRAME_LENGTH {
            return Err(MkvError::Bitstream(BitstreamError::ValueOverflow {
                value: frame_length as u64,
                bits: 13,
            }));
        }

        let mut writer = BitWriter::with_capacity(ADTS_HEADER_SIZE);
        writer.write_bits(0xFFF, 12)?; // syncword
        writer.write_bits(0, 1)?; // MPEG-4
        writer.write_bits(0, 2)?; // layer
        writer.write_bits(1, 1)?; // protection absent
        writer.write_bits((self.profile() & 0x03) as u32, 2)?;
        writer.write_bits((self.sampling_frequency_index & 0x0F) as u32, 4)?;
        writer.write_bits(0, 1)?; // private bit
        writer.write_bits((self.channel_config & 0x07) as u32, 3)?;
        writer.write_bits(0, 4)?; // original, home, copyright bits
        writer.write_bits(frame_length as u32, 13)?;
        writer.write_bits(0x7FF, 11)?; // buffer fullness (VBR)
        writer.write_bits(0, 2)?; // one raw data block

        let mut header = [0u8; ADTS_HEADER_SIZE];
        header.copy_from_slice(writer.data());
        Ok(header)
    }

    /// Append an ADTS frame (header then payload) to `out`.
    pub fn write_adts_frame(&self, out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
        out.extend_from_slice(&self.adts_header(payload.len())?);
        out.extend_from_slice(payload);
        Ok(())
    }
}

/// Decode the 13-bit frame length field of an ADTS header.
pub fn adts_frame_length(header: &[u8]) -> Option<u16> {
    if header.len() < ADTS_HEADER_SIZE {
        return None;
    }
    Some(
        ((header[3] as u16 & 0x03) << 11) | ((header[4] as u16) << 3) | ((header[5] as u16) >> 5),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lc_stereo_44100() {
        let config = AacConfig::parse(&[0x12, 0x10]).unwrap();
        assert_eq!(config.object_type, 2);
        assert_eq!(config.profile(), 1);
        assert_eq!(config.sampling_frequency_index, 4);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channel_config, 2);
    }

    #[test]
    fn test_parse_he_mono_48000() {
        // object type 5, index 3, channel config 1
        let config = AacConfig::parse(&[0x29, 0x88, 0x56, 0xE5]).unwrap();
        assert_eq!(config.object_type, 5);
        assert_eq!(config.sampling_frequency_index, 3);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channel_config, 1);
    }

    #[test]
    fn test_parse_single_byte() {
        let config = AacConfig::parse(&[0x11]).unwrap();
        assert_eq!(config.object_type, 2);
        assert_eq!(config.sampling_frequency_index, 2);
        assert_eq!(config.channel_config, 0);
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            AacConfig::parse(&[]),
            Err(MkvError::MalformedCodecPrivate {
                codec: "AudioSpecificConfig",
                ..
            })
        ));
    }

    #[test]
    fn test_reserved_index_has_zero_rate() {
        // index 13
        let config = AacConfig::parse(&[0x16, 0x90]).unwrap();
        assert_eq!(config.sampling_frequency_index, 13);
        assert_eq!(config.sample_rate, 0);
    }

    #[test]
    fn test_from_audio_settings() {
        let config = AacConfig::from_audio_settings(Some(47999.6), Some(6));
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.sampling_frequency_index, 3);
        assert_eq!(config.channel_config, 6);
        assert_eq!(config.object_type, 2);

        let config = AacConfig::from_audio_settings(Some(37800.0), None);
        assert_eq!(config.sample_rate, 37800);
        assert_eq!(config.sampling_frequency_index, 4);
        assert_eq!(config.channel_config, 2);

        assert_eq!(AacConfig::from_audio_settings(None, None), AacConfig::default());
    }

    #[test]
    fn test_adts_header_bytes() {
        let config = AacConfig::default();
        let header = config.adts_header(100).unwrap();

        let frame_len: u16 = 107;
        let expected = [
            0xFF,
            0xF1,
            (1 << 6) | (4 << 2),
            (2 << 6) | ((frame_len >> 11) & 0x03) as u8,
            ((frame_len >> 3) & 0xFF) as u8,
            (((frame_len & 0x07) << 5) as u8) | 0x1F,
            0xFC,
        ];
        assert_eq!(header, expected);
        assert_eq!(adts_frame_length(&header), Some(107));
    }

    #[test]
    fn test_adts_high_channel_bit() {
        let config = AacConfig {
            channel_config: 6,
            ..Default::default()
        };
        let header = config.adts_header(0).unwrap();
        assert_eq!(header[2] & 0x01, 1);
        assert_eq!(header[3] >> 6, 0b10);
    }

    #[test]
    fn test_adts_frame_too_large() {
        let config = AacConfig::default();
        assert!(config.adts_header(MAX_ADTS_FRAME_LENGTH - ADTS_HEADER_SIZE).is_ok());
        assert!(config
            .adts_header(MAX_ADTS_FRAME_LENGTH - ADTS_HEADER_SIZE + 1)
            .is_err());
    }

    #[test]
    fn test_write_adts_frame() {
        let mut out = Vec::new();
        AacConfig::default()
            .write_adts_frame(&mut out, &[0x21, 0x00, 0x49])
            .unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(&out[7..], &[0x21, 0x00, 0x49]);
        assert_eq!(adts_frame_length(&out), Some(10));
    }

    #[test]
    fn test_index_lookup() {
        assert_eq!(index_for_sample_rate(44100), Some(4));
        assert_eq!(index_for_sample_rate(7350), Some(12));
        assert_eq!(index_for_sample_rate(0), None);
        assert_eq!(sample_rate_for_index(15), 0);
        assert_eq!(sample_rate_for_index(200), 0);
    }
}
