//! Matroska demuxer error types.

use esdemux_core::error::{BitstreamError, ContainerError};
use thiserror::Error;

/// MKV-specific error types.
#[derive(Error, Debug)]
pub enum MkvError {
    /// Invalid variable-length integer (zero first byte).
    #[error("Invalid VINT encoding at offset {offset}")]
    InvalidVint {
        /// Byte offset where the invalid VINT was found.
        offset: u64,
    },

    /// A VINT or element header runs past the end of the buffer.
    #[error("Truncated element header at offset {offset}")]
    TruncatedHeader {
        /// Byte offset where the truncated header starts.
        offset: u64,
    },

    /// Fewer bytes remain than a fixed-width read requires.
    #[error("Unexpected end of data at offset {offset}: need {needed} bytes, have {available}")]
    UnexpectedEof {
        /// Byte offset of the read.
        offset: u64,
        /// Bytes requested.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// No Segment element in the buffer.
    #[error("Segment element not found")]
    SegmentNotFound,

    /// EBML header missing where one is required.
    #[error("Invalid EBML header: {0}")]
    InvalidEbmlHeader(String),

    /// Seek target beyond the end of the buffer.
    #[error("Seek to {target} beyond buffer length {len}")]
    SeekOutOfBounds {
        /// Requested absolute position.
        target: u64,
        /// Buffer length.
        len: u64,
    },

    /// A child element extends past its enclosing element.
    #[error("Element 0x{id:X} ends at {end}, beyond parent end {parent_end}")]
    ElementOutOfBounds {
        /// The offending element ID.
        id: u64,
        /// Declared end of the child.
        end: u64,
        /// End of the enclosing element.
        parent_end: u64,
    },

    /// Codec private data too short or inconsistent.
    #[error("Malformed {codec} codec private: {message}")]
    MalformedCodecPrivate {
        /// Configuration record kind ("avcC", "hvcC", "AudioSpecificConfig").
        codec: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// Invalid block structure.
    #[error("Invalid block structure: {0}")]
    InvalidBlock(String),

    /// Invalid lacing structure.
    #[error("Invalid lacing: {0}")]
    InvalidLacing(String),

    /// Operation requires a running demuxer.
    #[error("Demuxer is not running")]
    NotRunning,

    /// Bitstream error while reading or writing codec headers.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),
}

/// Result type for MKV operations.
pub type Result<T> = std::result::Result<T, MkvError>;

impl MkvError {
    /// Stable numeric code passed to [`DemuxListener::on_error`](crate::DemuxListener::on_error).
    pub fn code(&self) -> i32 {
        match self {
            MkvError::InvalidVint { .. } => 1,
            MkvError::TruncatedHeader { .. } => 2,
            MkvError::UnexpectedEof { .. } => 3,
            MkvError::SegmentNotFound => 4,
            MkvError::InvalidEbmlHeader(_) => 5,
            MkvError::SeekOutOfBounds { .. } => 6,
            MkvError::ElementOutOfBounds { .. } => 7,
            MkvError::MalformedCodecPrivate { .. } => 10,
            MkvError::InvalidBlock(_) => 20,
            MkvError::InvalidLacing(_) => 21,
            MkvError::NotRunning => 30,
            MkvError::Bitstream(_) => 40,
        }
    }

    /// Whether this error aborts the current consume call.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            MkvError::InvalidVint { .. }
                | MkvError::TruncatedHeader { .. }
                | MkvError::UnexpectedEof { .. }
                | MkvError::SegmentNotFound
                | MkvError::InvalidEbmlHeader(_)
                | MkvError::SeekOutOfBounds { .. }
                | MkvError::ElementOutOfBounds { .. }
        )
    }

    pub(crate) fn malformed(codec: &'static str, message: impl Into<String>) -> Self {
        MkvError::MalformedCodecPrivate {
            codec,
            message: message.into(),
        }
    }
}

impl From<esdemux_core::Error> for MkvError {
    fn from(err: esdemux_core::Error) -> Self {
        match err {
            esdemux_core::Error::Bitstream(e) => MkvError::Bitstream(e),
            esdemux_core::Error::NotRunning => MkvError::NotRunning,
            esdemux_core::Error::Container(e) => MkvError::InvalidBlock(e.to_string()),
        }
    }
}

impl From<MkvError> for esdemux_core::Error {
    fn from(err: MkvError) -> Self {
        let container = match err {
            MkvError::NotRunning => return esdemux_core::Error::NotRunning,
            MkvError::Bitstream(e) => return esdemux_core::Error::Bitstream(e),
            MkvError::SegmentNotFound => ContainerError::ElementNotFound("Segment".to_string()),
            MkvError::InvalidVint { offset } | MkvError::TruncatedHeader { offset } => {
                ContainerError::InvalidSize {
                    offset,
                    message: err.to_string(),
                }
            }
            MkvError::MalformedCodecPrivate { .. } => ContainerError::TrackConfig(err.to_string()),
            MkvError::InvalidBlock(_) | MkvError::InvalidLacing(_) => {
                ContainerError::InvalidBlock(err.to_string())
            }
            MkvError::InvalidEbmlHeader(_)
            | MkvError::UnexpectedEof { .. }
            | MkvError::SeekOutOfBounds { .. }
            | MkvError::ElementOutOfBounds { .. } => {
                ContainerError::MalformedStructure(err.to_string())
            }
        };
        esdemux_core::Error::Container(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MkvError::InvalidVint { offset: 100 };
        assert_eq!(err.to_string(), "Invalid VINT encoding at offset 100");

        let err = MkvError::ElementOutOfBounds {
            id: 0xAE,
            end: 90,
            parent_end: 64,
        };
        assert_eq!(
            err.to_string(),
            "Element 0xAE ends at 90, beyond parent end 64"
        );
    }

    #[test]
    fn test_structural_classification() {
        assert!(MkvError::SegmentNotFound.is_structural());
        assert!(MkvError::TruncatedHeader { offset: 3 }.is_structural());
        assert!(!MkvError::InvalidLacing("negative".into()).is_structural());
        assert!(!MkvError::malformed("avcC", "too short").is_structural());
        assert!(!MkvError::NotRunning.is_structural());
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            MkvError::InvalidVint { offset: 0 },
            MkvError::TruncatedHeader { offset: 0 },
            MkvError::SegmentNotFound,
            MkvError::SeekOutOfBounds { target: 1, len: 0 },
            MkvError::InvalidLacing(String::new()),
            MkvError::NotRunning,
        ];
        let mut codes: Vec<i32> = errors.iter().map(MkvError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_conversion_to_core_error() {
        let core_err: esdemux_core::Error = MkvError::SegmentNotFound.into();
        assert!(matches!(
            core_err,
            esdemux_core::Error::Container(ContainerError::ElementNotFound(_))
        ));

        let core_err: esdemux_core::Error = MkvError::InvalidVint { offset: 7 }.into();
        assert!(matches!(
            core_err,
            esdemux_core::Error::Container(ContainerError::InvalidSize { offset: 7, .. })
        ));

        let core_err: esdemux_core::Error = MkvError::InvalidLacing("uneven".into()).into();
        assert!(core_err.is_recoverable());

        let core_err: esdemux_core::Error = MkvError::NotRunning.into();
        assert!(matches!(core_err, esdemux_core::Error::NotRunning));
    }
}
