//! Topology and phase-derivation error types.

use tl_core::{LaneId, TlError};

/// Errors raised while validating topology or deriving phases.
///
/// `UnresolvedConflict` and `LaneSelfConflict` are configuration errors: the
/// junction cannot be controlled safely and must not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A junction without any stream.
    EmptyJunction,

    /// Streams must be listed in index order 0..n-1.
    StreamIndexMismatch { position: usize, index: usize },

    /// A relation matrix does not match the number of streams.
    MatrixShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A stream is recorded as its own foe.
    SelfConflict { stream: usize },

    /// Foes with no right-of-way in either direction.
    UnresolvedConflict { i: usize, j: usize },

    /// Streams sharing one signal head are incompatible with each other.
    LaneSelfConflict { lane: LaneId },

    /// Turning direction code not recognised.
    UnknownDirection { code: String },

    /// Character outside the light alphabet.
    InvalidLight { code: char },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::EmptyJunction => write!(f, "Junction has no streams"),
            GraphError::StreamIndexMismatch { position, index } => {
                write!(
                    f,
                    "Stream at position {} has index {} (indices must be 0..n-1 in order)",
                    position, index
                )
            }
            GraphError::MatrixShape {
                what,
                expected,
                found,
            } => {
                write!(
                    f,
                    "{} matrix has a dimension of {} (expected {})",
                    what, found, expected
                )
            }
            GraphError::SelfConflict { stream } => {
                write!(f, "Stream {} is listed as its own foe", stream)
            }
            GraphError::UnresolvedConflict { i, j } => {
                write!(
                    f,
                    "Streams {} and {} are foes but neither has priority over the other",
                    i, j
                )
            }
            GraphError::LaneSelfConflict { lane } => {
                write!(f, "Streams on lane '{}' conflict with each other", lane)
            }
            GraphError::UnknownDirection { code } => {
                write!(f, "Unknown turning direction '{}'", code)
            }
            GraphError::InvalidLight { code } => {
                write!(f, "Invalid light character '{}'", code)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for TlError {
    fn from(err: GraphError) -> Self {
        TlError::Invariant {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_conflict_message_names_both_streams() {
        let msg = GraphError::UnresolvedConflict { i: 2, j: 5 }.to_string();
        assert!(msg.contains('2') && msg.contains('5'));
    }

    #[test]
    fn converts_into_core_error() {
        let err: TlError = GraphError::EmptyJunction.into();
        assert!(matches!(err, TlError::Invariant { .. }));
    }
}
