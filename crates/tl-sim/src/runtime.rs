//! Mutable per-junction state owned by the signal state machine.

use std::collections::HashSet;
use std::fmt;

use tl_controls::LaneRates;
use tl_core::VehicleId;
use tl_graph::{LightString, PhaseTable};

use crate::error::SimResult;

/// Which half of the green/amber cycle the junction is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPhase {
    Green,
    Amber,
}

impl fmt::Display for SignalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalPhase::Green => f.write_str("green"),
            SignalPhase::Amber => f.write_str("amber"),
        }
    }
}

/// Vehicle movement on one open lane since its previous snapshot.
#[derive(Debug, Clone)]
pub(crate) struct LaneObservation {
    /// Position in `open_lanes`.
    pub position: usize,
    pub departed: usize,
    pub arrived: usize,
    pub present: HashSet<VehicleId>,
}

/// Runtime state of one junction.
///
/// Per-stream vectors are indexed by stream; `lane_rates` by incoming lane
/// slot.
#[derive(Debug, Clone)]
pub struct JunctionRuntimeState {
    pub(crate) signal: SignalPhase,
    pub(crate) current_phase: usize,
    pub(crate) current_lights: LightString,
    pub(crate) next_phase: usize,
    pub(crate) next_lights: LightString,
    pub(crate) green_timer: f64,
    pub(crate) amber_timer: f64,
    pub(crate) queues: Vec<f64>,
    pub(crate) capacities: Vec<f64>,
    pub(crate) green_times: Vec<f64>,
    pub(crate) target_cleared: f64,
    pub(crate) actual_cleared: f64,
    pub(crate) lane_rates: Vec<LaneRates>,
    /// Incoming lane slots open in the current green.
    pub(crate) open_lanes: Vec<usize>,
    /// Vehicles seen on each open lane at the previous observation.
    pub(crate) snapshots: Vec<HashSet<VehicleId>>,
    pub(crate) tick: u64,
}

impl JunctionRuntimeState {
    /// Start in amber with an expired timer so the first tick opens
    /// `initial_phase`. Every stream starts with `initial_green`.
    pub(crate) fn new(
        table: &PhaseTable,
        initial_phase: usize,
        initial_green: f64,
        rate_window: usize,
    ) -> SimResult<Self> {
        let n = table.stream_count();
        let lane_rates = (0..table.lane_index().incoming_count())
            .map(|_| LaneRates::new(rate_window))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            signal: SignalPhase::Amber,
            current_phase: initial_phase,
            current_lights: LightString::all_red(n),
            next_phase: initial_phase,
            next_lights: table.light_string(initial_phase).clone(),
            green_timer: initial_green,
            amber_timer: 0.0,
            queues: vec![0.0; n],
            capacities: vec![0.0; n],
            green_times: vec![initial_green; n],
            target_cleared: 0.0,
            actual_cleared: 0.0,
            lane_rates,
            open_lanes: Vec::new(),
            snapshots: Vec::new(),
            tick: 0,
        })
    }

    /// Fold one round of lane observations into clearance and rate
    /// bookkeeping. Rates are vehicles per second.
    pub(crate) fn apply_observations(&mut self, observations: Vec<LaneObservation>, dt: f64) {
        for obs in observations {
            self.actual_cleared += obs.departed as f64;
            let slot = self.open_lanes[obs.position];
            self.lane_rates[slot].record(obs.departed as f64 / dt, obs.arrived as f64 / dt);
            self.snapshots[obs.position] = obs.present;
        }
    }

    pub fn signal(&self) -> SignalPhase {
        self.signal
    }

    pub fn is_green(&self) -> bool {
        self.signal == SignalPhase::Green
    }

    /// Phase shown (or, during amber, the phase being closed).
    pub fn current_phase(&self) -> usize {
        self.current_phase
    }

    /// Light string last actuated.
    pub fn current_lights(&self) -> &LightString {
        &self.current_lights
    }

    /// Phase that opens when the amber elapses.
    pub fn next_phase(&self) -> usize {
        self.next_phase
    }

    pub fn next_lights(&self) -> &LightString {
        &self.next_lights
    }

    pub fn green_timer(&self) -> f64 {
        self.green_timer
    }

    pub fn amber_timer(&self) -> f64 {
        self.amber_timer
    }

    pub fn queues(&self) -> &[f64] {
        &self.queues
    }

    pub fn capacities(&self) -> &[f64] {
        &self.capacities
    }

    /// Green time each stream gets the next time its phase opens.
    pub fn green_times(&self) -> &[f64] {
        &self.green_times
    }

    pub fn target_cleared(&self) -> f64 {
        self.target_cleared
    }

    pub fn actual_cleared(&self) -> f64 {
        self.actual_cleared
    }

    /// Rate estimates of an incoming lane slot.
    pub fn lane_rates(&self, slot: usize) -> Option<&LaneRates> {
        self.lane_rates.get(slot)
    }

    pub fn open_lanes(&self) -> &[usize] {
        &self.open_lanes
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}
