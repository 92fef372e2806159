//! Error type shared by the raster and stream layers.

use std::io;

/// Errors from raster decoding, delta encoding and ARF stream handling.
///
/// Every variant is fatal for the frame pair being processed; callers decide
/// whether to continue with the remaining pairs.
#[derive(Debug, thiserror::Error)]
pub enum ArfError {
    /// Bad magic bytes or an unsupported header field.
    #[error("Invalid format: {0}")]
    Format(String),

    /// Raster dimensions outside the supported resolution.
    #[error("Unsupported raster dimensions {width}x{height}")]
    Dimensions { width: i64, height: i64 },

    /// Two frames of different shape were diffed.
    #[error("Frame shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Underlying read, write or seek failure (including truncated input).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ArfError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        ArfError::Format(msg.into())
    }
}

/// Crate result alias.
pub type Result<T, E = ArfError> = std::result::Result<T, E>;
