//! Signal runtime for traffic-light junctions.
//!
//! Provides:
//! - Collaborator traits for the traffic simulator (sensors and actuator)
//!   and for the topology source
//! - Amber synthesis between two green settings
//! - `SignalStateMachine`: one junction's green/amber cycle
//! - `IntersectionRegistry`: all junctions, ticked sequentially or in
//!   parallel
//! - Green-time history per junction

pub mod amber;
pub mod error;
pub mod io;
pub mod machine;
pub mod records;
pub mod registry;
pub mod runtime;

pub use amber::{AmberTransition, synthesize};
pub use error::{SimError, SimResult};
pub use io::{CollaboratorError, SignalIo, TopologyProvider};
pub use machine::{MachineOptions, SignalStateMachine};
pub use records::{GreenTimeHistory, GreenTimeRecord};
pub use registry::{IntersectionRegistry, fetch_topology};
pub use runtime::{JunctionRuntimeState, SignalPhase};
