//! Error types for hdrshot-core operations.
//!
//! Only structural problems with buffers live here. Numeric edge cases
//! (negative light, NaN half floats) are clamped where they occur and
//! never surface as errors.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when constructing or accessing core buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Sample count does not match `width * height * channels`.
    #[error("sample count mismatch: expected {expected}, got {got}")]
    SampleCountMismatch {
        /// Expected number of samples
        expected: usize,
        /// Actual number of samples
        got: usize,
    },

    /// Width or height is zero, or the buffer size would overflow.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::SampleCountMismatch`] error.
    #[inline]
    pub fn sample_count(expected: usize, got: usize) -> Self {
        Self::SampleCountMismatch { expected, got }
    }
}

/// Computes `width * height * channels`, rejecting zero sizes and overflow.
pub fn checked_sample_count(width: u32, height: u32, channels: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "zero-sized image"));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows usize"))
}
