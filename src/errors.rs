//! Error types.
//!
//! [`DecodeError`] covers malformed IDX content, [`SourceError`] covers failures to
//! obtain the raw bytes at all, and [`Error`] is what the split-level API returns.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A structural problem found while parsing an IDX file.
///
/// Every variant carries the byte offset at which the failing check looked.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ends before the bytes its header declares.
    #[error("truncated input: needed {needed} bytes, got {actual}")]
    TruncatedInput { needed: usize, actual: usize },

    /// The payload type byte is not 0x08 (unsigned byte).
    #[error("unsupported payload type {found:#04x} at byte {offset}")]
    UnsupportedPayloadType { found: u8, offset: usize },

    /// The dimension count byte does not match the rank the caller expects.
    #[error("expected {expected} dimensions, found {found} at byte {offset}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        offset: usize,
    },
}

impl DecodeError {
    /// Byte offset at which the failing check applied.
    ///
    /// For truncation this is the input length: the first offset that could not be read.
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::TruncatedInput { actual, .. } => actual,
            DecodeError::UnsupportedPayloadType { offset, .. } => offset,
            DecodeError::DimensionMismatch { offset, .. } => offset,
        }
    }
}

/// Failure to obtain the raw bytes of a dataset file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network failure fetching {name}: {source}")]
    Network {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("local I/O failure on {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dataset file not available: {0}")]
    NotFound(String),
}

impl SourceError {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> SourceError {
        SourceError::LocalIo {
            path: path.into(),
            source,
        }
    }
}

/// Error returned by the split-level API.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("{split} split has {images} images but {labels} labels")]
    CountMismatch {
        split: &'static str,
        images: usize,
        labels: usize,
    },

    #[error("invalid source config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn test_offsets() {
    let e = DecodeError::TruncatedInput {
        needed: 16,
        actual: 9,
    };
    assert_eq!(e.offset(), 9);
    let e = DecodeError::UnsupportedPayloadType {
        found: 0x09,
        offset: 2,
    };
    assert_eq!(e.offset(), 2);
    assert_eq!(e.to_string(), "unsupported payload type 0x09 at byte 2");
}
