//! Error types for fingermatch.

use thiserror::Error;

/// Result alias for fingermatch operations.
pub type FingerResult<T> = std::result::Result<T, FingerError>;

/// Errors that can occur when configuring or running extraction and matching.
///
/// Degenerate inputs (blank images, empty templates) are not errors; they
/// produce empty templates and zero scores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FingerError {
    /// Image or grid dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Block size must be positive.
    #[error("invalid block size {0}")]
    InvalidBlockSize(usize),
    /// Resolution must be positive.
    #[error("invalid dpi {0}")]
    InvalidDpi(u32),
    /// A tunable parameter is outside its declared range.
    #[error("parameter {name} = {value} outside [{lower}, {upper}]")]
    ParameterOutOfRange {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
    /// No tunable parameter exists under the given path.
    #[error("unknown parameter {0}")]
    UnknownParameter(String),
    /// A scheduled task panicked; the payload message is preserved.
    #[error("threaded task failed: {reason}")]
    TaskFailed { reason: String },
    /// Image decoding failed.
    #[cfg(feature = "image-io")]
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
