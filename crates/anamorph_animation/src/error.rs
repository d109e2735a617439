//! Animation error types

use thiserror::Error;

/// Errors raised while configuring a spring
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpringError {
    /// Stiffness outside (0, 1]
    #[error("stiffness must be in (0, 1], got {0}")]
    Stiffness(f64),

    /// Damping outside (0, 1)
    #[error("damping must be in (0, 1), got {0}")]
    Damping(f64),

    /// Preset name that is not in the catalog
    #[error("unknown spring preset: {0} (expected subtle, medium, expressive or custom)")]
    UnknownPreset(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, SpringError>;
