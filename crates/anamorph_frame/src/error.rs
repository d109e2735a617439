//! Framing error types

use thiserror::Error;

/// Aspect-ratio parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AspectError {
    /// Not a `W:H` pair or a positive decimal
    #[error("invalid aspect ratio: {0:?} (expected W:H or a positive number)")]
    Invalid(String),
}

/// Framing and de-squeeze errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Aspect(#[from] AspectError),

    /// Squeeze ratio that is not a positive finite number
    #[error("squeeze ratio must be a positive finite number, got {0}")]
    InvalidRatio(f64),

    /// Source image without pixels
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// De-squeezed output beyond the pixel limit
    #[error(
        "de-squeezed output {width}x{height} exceeds {max} pixels",
        max = crate::desqueeze::MAX_OUTPUT_PIXELS
    )]
    OutputTooLarge { width: f64, height: u32 },

    /// Unrecognised overlay mode
    #[error("unknown overlay mode: {0} (expected matte or frame)")]
    UnknownOverlay(String),

    /// Unrecognised export format or mime type
    #[error("unsupported export format: {0} (expected png, jpeg or webp)")]
    UnknownFormat(String),

    #[error("image I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for framing operations
pub type Result<T> = std::result::Result<T, FrameError>;
