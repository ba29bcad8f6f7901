//! Rolling per-lane rate estimates (μ departures, λ arrivals).
//!
//! Samples arrive once per observation (vehicles per second). Until the
//! window has filled, the estimate is the plain mean of everything seen so
//! far; afterwards it slides, replacing the oldest sample with the newest.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Window length in samples for a trailing window of `window_s` seconds
/// observed every `dt` seconds. Never less than one sample.
pub fn window_samples(window_s: f64, dt: f64) -> usize {
    if !(window_s.is_finite() && dt.is_finite()) || dt <= 0.0 {
        return 1;
    }
    let samples = (window_s / dt).round();
    if samples < 1.0 { 1 } else { samples as usize }
}

/// Windowed moving average over a fixed number of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingRate {
    window: usize,
    samples: VecDeque<f64>,
    value: f64,
}

impl RollingRate {
    /// Create an empty estimator.
    ///
    /// # Arguments
    ///
    /// * `window` - Number of samples in the trailing window (must be positive)
    pub fn new(window: usize) -> ControlResult<Self> {
        if window == 0 {
            return Err(ControlError::InvalidArg {
                what: "rate window must hold at least one sample",
            });
        }
        Ok(Self {
            window,
            samples: VecDeque::with_capacity(window.min(4096)),
            value: 0.0,
        })
    }

    /// Add one sample and update the estimate.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() < self.window {
            self.samples.push_back(sample);
            let count = self.samples.len() as f64;
            self.value += (sample - self.value) / count;
        } else {
            let oldest = self.samples.pop_front().unwrap_or(0.0);
            self.samples.push_back(sample);
            self.value += (sample - oldest) / self.window as f64;
        }
    }

    /// Current estimate; zero before the first sample.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.window
    }
}

/// Service and arrival estimates for one incoming lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRates {
    /// Departures per second.
    pub mu: RollingRate,
    /// Arrivals per second.
    pub lambda: RollingRate,
}

impl LaneRates {
    pub fn new(window: usize) -> ControlResult<Self> {
        Ok(Self {
            mu: RollingRate::new(window)?,
            lambda: RollingRate::new(window)?,
        })
    }

    /// Record one observation of departures and arrivals (both per second).
    pub fn record(&mut self, departures: f64, arrivals: f64) {
        self.mu.push(departures);
        self.lambda.push(arrivals);
    }

    /// Net drain rate, μ - λ.
    pub fn net_service(&self) -> f64 {
        self.mu.value() - self.lambda.value()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn matches_trailing_mean(
            window in 1usize..8,
            samples in prop::collection::vec(0.0f64..50.0, 1..40),
        ) {
            let mut r = RollingRate::new(window).unwrap();
            for &s in &samples {
                r.push(s);
            }
            let tail = &samples[samples.len().saturating_sub(window)..];
            let expected = tail.iter().sum::<f64>() / tail.len() as f64;
            prop_assert!((r.value() - expected).abs() < 1e-6);
        }
    }
}
