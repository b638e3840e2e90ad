//! Error types shared by the esdemux crates.
//!
//! Container front ends keep their own detailed error enums and convert
//! into [`Error`] at the crate boundary.

use thiserror::Error;

/// Top-level esdemux error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// Operation attempted while the demuxer is idle.
    #[error("Demuxer is not running")]
    NotRunning,
}

/// Faults in the container structure or in per-track configuration.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// A required top-level element is absent.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The element tree cannot be followed.
    #[error("Malformed structure: {0}")]
    MalformedStructure(String),

    /// A length or size field could not be decoded.
    #[error("Invalid size field at offset {offset}: {message}")]
    InvalidSize { offset: u64, message: String },

    /// A codec configuration record carried by a track is unusable.
    #[error("Track configuration error: {0}")]
    TrackConfig(String),

    /// A block or frame could not be split out of the container.
    #[error("Invalid block: {0}")]
    InvalidBlock(String),
}

/// Faults while reading or writing bit fields.
#[derive(Error, Debug)]
pub enum BitstreamError {
    #[error("Bitstream ended: needed {needed} bits, {available} available")]
    UnexpectedEnd { needed: usize, available: usize },

    /// Field width beyond what one call supports.
    #[error("Field of {0} bits is too wide")]
    FieldTooWide(u8),

    /// Value does not fit in the requested bit width.
    #[error("Value {value} does not fit in {bits} bits")]
    ValueOverflow { value: u64, bits: u8 },
}

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error only affects a single track, block or frame.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Container(ContainerError::TrackConfig(_) | ContainerError::InvalidBlock(_))
                | Error::Bitstream(BitstreamError::ValueOverflow { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_error_conversion() {
        let err: Error = ContainerError::ElementNotFound("Segment".into()).into();
        assert!(matches!(
            err,
            Error::Container(ContainerError::ElementNotFound(_))
        ));
        assert_eq!(err.to_string(), "Container error: Element not found: Segment");
    }

    #[test]
    fn test_bitstream_error_display() {
        let err: Error = BitstreamError::UnexpectedEnd {
            needed: 5,
            available: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Bitstream error: Bitstream ended: needed 5 bits, 3 available"
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Container(ContainerError::TrackConfig("avcC".into())).is_recoverable());
        assert!(Error::Container(ContainerError::InvalidBlock("lace".into())).is_recoverable());

        assert!(!Error::NotRunning.is_recoverable());
        assert!(!Error::Container(ContainerError::MalformedStructure("x".into())).is_recoverable());
        assert!(!Error::Bitstream(BitstreamError::FieldTooWide(40)).is_recoverable());
    }
}
