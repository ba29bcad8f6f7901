//! Error types for green-time and scheduling policies.

use thiserror::Error;
use tl_core::TlError;

/// Result type for control policy operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while building or evaluating a control policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a policy constructor or estimator.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A scheduler was asked to choose among zero phases.
    #[error("No phases to choose from")]
    EmptyPhaseSet,

    /// Per-stream vectors handed to a scheduler disagree in length.
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

impl From<ControlError> for TlError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::InvalidArg { what } => TlError::InvalidArg { what },
            other => TlError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
