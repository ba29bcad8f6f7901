//! Green-time controllers.
//!
//! Each controller turns the clearance feedback of the phase that just ended
//! into the green duration the same streams get next time. Three policies:
//! - **MinMax**: bisect toward `t_min` or `t_max` depending on over/under
//!   clearance
//! - **Proportional**: relative clearance error scaled by a gain
//! - **ModelBased**: queue target divided by the net drain rate μ - λ
//!
//! Every result is clamped into `[t_min, t_max]`. Degenerate inputs (zero
//! target, non-positive drain rate) fall back to a bound instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};
use tl_core::{Tolerances, nearly_equal};
use tracing::warn;

use crate::error::{ControlError, ControlResult};
use crate::rates::LaneRates;

/// Lower and upper limit on a green duration (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenBounds {
    pub t_min: f64,
    pub t_max: f64,
}

impl GreenBounds {
    pub fn new(t_min: f64, t_max: f64) -> ControlResult<Self> {
        if !(t_min.is_finite() && t_max.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "green bounds must be finite",
            });
        }
        if t_min < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "t_min must be non-negative",
            });
        }
        if t_min > t_max {
            return Err(ControlError::InvalidArg {
                what: "t_min must not exceed t_max",
            });
        }
        Ok(Self { t_min, t_max })
    }

    pub fn midpoint(&self) -> f64 {
        (self.t_min + self.t_max) / 2.0
    }

    /// Clamp into range. NaN maps to `t_min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            warn!("green-time computation produced NaN, using t_min");
            return self.t_min;
        }
        value.clamp(self.t_min, self.t_max)
    }
}

/// What happened during the green phase that is ending.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearanceFeedback {
    /// Vehicles the phase was expected to clear.
    pub target_cleared: f64,
    /// Vehicles that actually left the open lanes.
    pub actual_cleared: f64,
    /// Green duration the phase just used (seconds).
    pub current_green: f64,
}

/// A policy computing the next green duration for the streams of an ending
/// phase.
pub trait GreenTimeController: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn bounds(&self) -> GreenBounds;

    /// Green time every stream starts with.
    fn initial_green(&self) -> f64 {
        self.bounds().midpoint()
    }

    /// Next green duration, always within [`bounds`](Self::bounds).
    ///
    /// `lanes` holds the rate estimates of the ending phase's open lanes.
    fn compute_next_green(&self, feedback: &ClearanceFeedback, lanes: &[&LaneRates]) -> f64;
}

/// Halves the distance to `t_min` when the phase over-cleared, to `t_max`
/// when it under-cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxController {
    pub bounds: GreenBounds,
}

impl MinMaxController {
    pub fn new(t_min: f64, t_max: f64) -> ControlResult<Self> {
        Ok(Self {
            bounds: GreenBounds::new(t_min, t_max)?,
        })
    }
}

impl GreenTimeController for MinMaxController {
    fn name(&self) -> &'static str {
        "min_max"
    }

    fn bounds(&self) -> GreenBounds {
        self.bounds
    }

    fn compute_next_green(&self, feedback: &ClearanceFeedback, _lanes: &[&LaneRates]) -> f64 {
        let ClearanceFeedback {
            target_cleared,
            actual_cleared,
            current_green,
        } = *feedback;

        let next = if nearly_equal(actual_cleared, target_cleared, Tolerances::default()) {
            current_green
        } else if actual_cleared > target_cleared {
            (current_green + self.bounds.t_min) / 2.0
        } else {
            (current_green + self.bounds.t_max) / 2.0
        };
        self.bounds.clamp(next)
    }
}

/// `next = current + gain * ((target - actual) / target) * current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionalController {
    pub gain: f64,
    pub bounds: GreenBounds,
}

impl ProportionalController {
    /// # Arguments
    ///
    /// * `gain` - Proportional gain K (finite)
    /// * `t_min` - Shortest green (seconds)
    /// * `t_max` - Longest green (seconds)
    pub fn new(gain: f64, t_min: f64, t_max: f64) -> ControlResult<Self> {
        if !gain.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "gain must be finite",
            });
        }
        Ok(Self {
            gain,
            bounds: GreenBounds::new(t_min, t_max)?,
        })
    }
}

impl GreenTimeController for ProportionalController {
    fn name(&self) -> &'static str {
        "proportional"
    }

    fn bounds(&self) -> GreenBounds {
        self.bounds
    }

    fn compute_next_green(&self, feedback: &ClearanceFeedback, _lanes: &[&LaneRates]) -> f64 {
        let target = feedback.target_cleared;
        let error = if target > 0.0 {
            ((target - feedback.actual_cleared) / target) * feedback.current_green
        } else {
            0.0
        };
        self.bounds.clamp(feedback.current_green + self.gain * error)
    }
}

/// Green long enough to drain the target at the observed net service rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBasedController {
    pub bounds: GreenBounds,
}

impl ModelBasedController {
    pub fn new(t_min: f64, t_max: f64) -> ControlResult<Self> {
        Ok(Self {
            bounds: GreenBounds::new(t_min, t_max)?,
        })
    }
}

impl GreenTimeController for ModelBasedController {
    fn name(&self) -> &'static str {
        "model_based"
    }

    fn bounds(&self) -> GreenBounds {
        self.bounds
    }

    fn compute_next_green(&self, feedback: &ClearanceFeedback, lanes: &[&LaneRates]) -> f64 {
        if feedback.target_cleared <= 0.0 {
            return self.bounds.t_min;
        }
        let drain: f64 = lanes.iter().map(|l| l.net_service()).sum();
        if drain <= 0.0 {
            // Queue is not shrinking at all
            return self.bounds.t_max;
        }
        self.bounds.clamp(feedback.target_cleared / drain)
    }
}
