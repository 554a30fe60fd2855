//! Error types for container decoding and encoding.
//!
//! Malformed and unsupported inputs are fatal for the file being read; the
//! variant tells the caller which of the two it was.

use std::io;
use thiserror::Error;

/// Container codec error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Format not handled by this crate.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or corrupted file: bad magic, truncation, bad header syntax.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Valid file using a feature outside the supported subset.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Decompression or sample reconstruction failed.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Missing required data.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Decoded geometry does not match the sample buffer.
    #[error(transparent)]
    Core(#[from] hdrshot_core::Error),
}

impl IoError {
    /// Shorthand for a truncated stream.
    pub(crate) fn truncated(what: &str) -> Self {
        Self::InvalidFile(format!("truncated {what}"))
    }
}

/// Result type for container operations.
pub type IoResult<T> = Result<T, IoError>;

/// Maps unexpected EOF onto [`IoError::InvalidFile`].
pub(crate) fn eof_as_truncated(what: &'static str) -> impl Fn(io::Error) -> IoError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            IoError::truncated(what)
        } else {
            IoError::Io(e)
        }
    }
}
