//! Collaborator interfaces.
//!
//! The traffic simulator sits on the other side of these traits: it reports
//! queues, vehicle identities and downstream room per lane, and receives the
//! light string for each junction. Topology comes from a separate provider
//! that is consulted once at registration.
//!
//! Methods take `&self` so one collaborator can serve junctions ticked on
//! several threads; implementations needing mutation use interior
//! mutability.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tl_core::{JunctionId, LaneId, VehicleId};
use tl_graph::{LightString, Stream};

/// A collaborator call that did not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation}({target}) failed: {message}")]
pub struct CollaboratorError {
    pub operation: &'static str,
    pub target: String,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(
        operation: &'static str,
        target: impl fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            target: target.to_string(),
            message: message.into(),
        }
    }
}

/// Sensor and actuator side of the simulator.
pub trait SignalIo {
    /// Vehicles currently on an incoming lane.
    fn queue_length(&self, lane: &LaneId) -> Result<u32, CollaboratorError>;

    /// Identities of the vehicles currently on a lane.
    fn vehicle_ids(&self, lane: &LaneId) -> Result<HashSet<VehicleId>, CollaboratorError>;

    /// Free vehicle spaces on an outgoing lane. Negative when the lane is
    /// over-full.
    fn downstream_capacity(&self, lane: &LaneId) -> Result<i64, CollaboratorError>;

    /// Show `lights` at a junction (`lights[i]` is stream i's aspect).
    fn set_signal_state(
        &self,
        junction: &JunctionId,
        lights: &LightString,
    ) -> Result<(), CollaboratorError>;
}

/// Source of raw right-of-way topology.
pub trait TopologyProvider {
    /// Streams in index order.
    fn get_streams(&self, junction: &JunctionId) -> Result<Vec<Stream>, CollaboratorError>;

    fn get_foe_matrix(&self, junction: &JunctionId) -> Result<Vec<Vec<bool>>, CollaboratorError>;

    fn get_priority_matrix(
        &self,
        junction: &JunctionId,
    ) -> Result<Vec<Vec<bool>>, CollaboratorError>;
}
