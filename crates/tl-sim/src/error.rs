//! Error types for the signal runtime.

use thiserror::Error;
use tl_controls::ControlError;
use tl_core::{JunctionId, TlError};
use tl_graph::GraphError;

use crate::io::CollaboratorError;

/// Errors raised while registering or ticking junctions. All of them are
/// fatal for the run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Junction {junction}: collaborator failure: {source}")]
    Collaborator {
        junction: JunctionId,
        #[source]
        source: CollaboratorError,
    },

    #[error("Junction {junction}: phase derivation failed: {source}")]
    Topology {
        junction: JunctionId,
        #[source]
        source: GraphError,
    },

    #[error("No amber transition from '{from}' to '{to}' (stream {stream})")]
    AmberTransition { stream: usize, from: char, to: char },

    #[error("Light string length mismatch: expected {expected}, found {found}")]
    LightLength { expected: usize, found: usize },

    #[error("Junction {junction} is already registered")]
    DuplicateJunction { junction: JunctionId },

    #[error("Control policy error: {0}")]
    Control(#[from] ControlError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<SimError> for TlError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::InvalidArg { what } => TlError::InvalidArg { what },
            other => TlError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
