//! Error types for conversions.

use hdrshot_io::{Format, IoError};
use thiserror::Error;

/// Result type alias using [`ConvertError`].
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that abort the conversion of one file.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Container decode or encode failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Buffer geometry was rejected.
    #[error(transparent)]
    Core(#[from] hdrshot_core::Error),

    /// An external codec reported a failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// The input needs an external codec that was not supplied.
    #[error("no {format} codec available")]
    NoBackend {
        /// Format that needed the codec
        format: Format,
    },

    /// Input format is not handled at all.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}

impl ConvertError {
    /// Creates a [`ConvertError::Backend`] error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// A failed conversion, attributed to its input.
#[derive(Debug, Error)]
#[error("{name}: {error}")]
pub struct FileFailure {
    /// Original file name.
    pub name: String,
    /// Why the conversion failed.
    #[source]
    pub error: ConvertError,
}
