//! Serializable policy selection.
//!
//! The set of strategies is closed and chosen at configuration time, so it
//! is expressed as internally tagged enums that build shared trait objects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ControlResult;
use crate::green_time::{
    GreenTimeController, MinMaxController, ModelBasedController, ProportionalController,
};
use crate::scheduler::{CongestionAware, DemandOptimizing, MaxWeight, Scheduler};

pub type SharedGreenTimeController = Arc<dyn GreenTimeController>;
pub type SharedScheduler = Arc<dyn Scheduler>;

/// Green-time controller selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GreenTimePolicy {
    MinMax { t_min: f64, t_max: f64 },
    Proportional { gain: f64, t_min: f64, t_max: f64 },
    ModelBased { t_min: f64, t_max: f64 },
}

impl Default for GreenTimePolicy {
    fn default() -> Self {
        Self::MinMax {
            t_min: 10.0,
            t_max: 60.0,
        }
    }
}

impl GreenTimePolicy {
    /// Validate parameters and construct the controller.
    pub fn build(&self) -> ControlResult<SharedGreenTimeController> {
        let controller: SharedGreenTimeController = match *self {
            Self::MinMax { t_min, t_max } => Arc::new(MinMaxController::new(t_min, t_max)?),
            Self::Proportional { gain, t_min, t_max } => {
                Arc::new(ProportionalController::new(gain, t_min, t_max)?)
            }
            Self::ModelBased { t_min, t_max } => {
                Arc::new(ModelBasedController::new(t_min, t_max)?)
            }
        };
        Ok(controller)
    }
}

/// Scheduler selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SchedulerPolicy {
    #[default]
    MaxWeight,
    CongestionAware,
    DemandOptimizing,
}

impl SchedulerPolicy {
    pub fn build(&self) -> SharedScheduler {
        match self {
            Self::MaxWeight => Arc::new(MaxWeight),
            Self::CongestionAware => Arc::new(CongestionAware),
            Self::DemandOptimizing => Arc::new(DemandOptimizing),
        }
    }
}
