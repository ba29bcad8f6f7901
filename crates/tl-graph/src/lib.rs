//! tl-graph: junction topology and phase derivation.
//!
//! Provides:
//! - Raw right-of-way topology (streams, foes, priorities) with validation
//! - Lane indexing (which streams share a signal head / a downstream lane)
//! - The light alphabet (`r`, `g`, `G`, `y`) and light strings
//! - `ConflictGraphBuilder`, which turns topology into a `PhaseTable`
//!
//! # Example
//!
//! ```
//! use tl_graph::{ConflictGraphBuilder, Direction, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new();
//! let north = builder.add_stream("n_0", "s_out_0", Direction::Through);
//! let south_left = builder.add_stream("s_0", "w_out_0", Direction::Left);
//! builder.set_priority(north, south_left);
//! let topology = builder.build().unwrap();
//!
//! let table = ConflictGraphBuilder::default().derive(&topology).unwrap();
//! assert_eq!(table.len(), 2);
//! // The opposing left turn runs alongside the through movement but yields.
//! assert_eq!(table.light_string(0).to_string(), "Gg");
//! ```

pub mod builder;
pub mod conflict;
pub mod error;
pub mod indexing;
pub mod light;
pub mod phase;
pub mod topology;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::TopologyBuilder;
pub use conflict::{ConflictGraphBuilder, ResolutionModel};
pub use error::GraphError;
pub use indexing::LaneIndex;
pub use light::{Light, LightString};
pub use phase::{CompatibilityMatrix, Phase, PhaseTable};
pub use topology::{Direction, JunctionTopology, Stream};
