//! Error types for the analytics pipeline.

use thiserror::Error;

/// Errors raised by the analytics core.
///
/// Structural problems (`InvalidChunkSize`, `PreconditionViolation`) are only
/// reported while a [`crate::Pipeline`] is being constructed. Degenerate
/// signals are normally absorbed into sentinel values and only surface from
/// the lower-level helpers that are asked to fail on them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Raised by strict helpers such as `core::sax::try_z_normalize`
    #[error("degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("invalid chunk size {size}: must be a non-zero power of two")]
    InvalidChunkSize { size: usize },

    #[error("index {index} out of range for buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("expected {expected} readings per tick, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PipelineError::InvalidChunkSize { size: 6 };
        assert_eq!(
            err.to_string(),
            "invalid chunk size 6: must be a non-zero power of two"
        );

        let err = PipelineError::IndexOutOfRange { index: 12, len: 3 };
        assert!(err.to_string().contains("index 12"));
    }
}
