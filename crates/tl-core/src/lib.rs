//! tl-core: stable foundation for the traffic-light controller.
//!
//! Contains:
//! - ids (string identifiers for junctions, lanes and vehicles)
//! - numeric (Real + tolerances + float/timer helpers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TlError, TlResult};
pub use ids::*;
pub use numeric::*;
