//! Control policies for signalised junctions.
//!
//! Two independent strategy families plug into the signal state machine:
//! - [`GreenTimeController`]: how long the next green lasts, from the
//!   clearance feedback of the phase that just ended
//! - [`Scheduler`]: which phase opens next, from per-stream queues and
//!   downstream capacity
//!
//! Both are stateless apart from their fixed parameters. Rolling service and
//! arrival estimates live in [`LaneRates`], owned by the caller.

pub mod error;
pub mod green_time;
pub mod policy;
pub mod rates;
pub mod scheduler;

pub use error::{ControlError, ControlResult};
pub use green_time::{
    ClearanceFeedback, GreenBounds, GreenTimeController, MinMaxController, ModelBasedController,
    ProportionalController,
};
pub use policy::{GreenTimePolicy, SchedulerPolicy, SharedGreenTimeController, SharedScheduler};
pub use rates::{LaneRates, RollingRate, window_samples};
pub use scheduler::{
    CongestionAware, DemandOptimizing, MaxWeight, Scheduler, SchedulerInput, argmax_random,
};
