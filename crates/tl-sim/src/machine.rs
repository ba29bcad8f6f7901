//! Per-junction green/amber state machine.
//!
//! Each tick does exactly one of:
//! - **amber elapsed**: actuate the pending green setting and enter green
//! - **amber running**: count the amber timer down
//! - **green elapsed**: run the switching pipeline (below) and enter amber
//! - **green running**: count the green timer down and observe departures
//!
//! The switching pipeline runs in a fixed order:
//! 1. sample queues per stream
//! 2. sample downstream capacity per stream
//! 3. finish clearance bookkeeping for the ending phase's open lanes
//! 4. compute the ending phase's next green time
//! 5. choose the next phase
//! 6. set the clearance target of the chosen phase
//! 7. stage its green timer and light string
//! 8. synthesize the amber setting
//! 9. actuate the amber setting
//!
//! Steps 1 to 3 only refresh sampled data. Everything that changes what the
//! junction shows (phase, lights, timers, green times) is staged and only
//! committed once actuation has succeeded.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tl_controls::{
    ClearanceFeedback, LaneRates, SchedulerInput, SharedGreenTimeController, SharedScheduler,
    window_samples,
};
use tl_core::{JunctionId, LaneId, ensure_positive, timer_expired};
use tl_graph::{LightString, PhaseTable};
use tracing::{debug, info, trace};

use crate::amber;
use crate::error::{SimError, SimResult};
use crate::io::{CollaboratorError, SignalIo};
use crate::records::{GreenTimeHistory, GreenTimeRecord};
use crate::runtime::{JunctionRuntimeState, LaneObservation, SignalPhase};

/// Construction-time options for one junction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Tick length (seconds)
    pub dt: f64,
    /// Amber length in ticks when the setting changes
    pub amber_ticks: u32,
    /// Share of the queue a green phase is expected to clear (x*)
    pub removal_fraction: f64,
    /// Trailing window for μ/λ estimates (seconds)
    pub rate_window_s: f64,
    /// Seed for tie-breaking and the initial phase
    pub seed: u64,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            amber_ticks: 5,
            removal_fraction: 0.5,
            rate_window_s: 600.0,
            seed: 42,
        }
    }
}

impl MachineOptions {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.dt, "dt").map_err(|_| SimError::InvalidArg {
            what: "dt must be positive and finite",
        })?;
        if self.amber_ticks == 0 {
            return Err(SimError::InvalidArg {
                what: "amber_ticks must be at least one",
            });
        }
        if !(0.0..=1.0).contains(&self.removal_fraction) {
            return Err(SimError::InvalidArg {
                what: "removal_fraction must lie in [0, 1]",
            });
        }
        ensure_positive(self.rate_window_s, "rate_window_s").map_err(|_| {
            SimError::InvalidArg {
                what: "rate_window_s must be positive and finite",
            }
        })?;
        Ok(())
    }

    /// μ/λ window length in samples.
    pub fn rate_window(&self) -> usize {
        window_samples(self.rate_window_s, self.dt)
    }
}

/// Everything a green-to-amber switch will commit once actuation succeeds.
struct StagedSwitch {
    next_phase: usize,
    next_lights: LightString,
    amber_lights: LightString,
    green_timer: f64,
    amber_timer: f64,
    target_cleared: f64,
    green_times: Vec<f64>,
    record: GreenTimeRecord,
}

/// Signal controller for one junction.
#[derive(Debug)]
pub struct SignalStateMachine {
    id: JunctionId,
    table: PhaseTable,
    membership: Vec<Vec<bool>>,
    green_time: SharedGreenTimeController,
    scheduler: SharedScheduler,
    options: MachineOptions,
    rng: ChaCha8Rng,
    state: JunctionRuntimeState,
    history: GreenTimeHistory,
}

impl SignalStateMachine {
    /// Create a machine whose first tick opens a randomly chosen phase.
    pub fn new(
        id: JunctionId,
        table: PhaseTable,
        green_time: SharedGreenTimeController,
        scheduler: SharedScheduler,
        options: MachineOptions,
    ) -> SimResult<Self> {
        options.validate()?;
        if table.is_empty() {
            return Err(SimError::InvalidArg {
                what: "phase table is empty",
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        let initial_phase = rng.gen_range(0..table.len());
        let state = JunctionRuntimeState::new(
            &table,
            initial_phase,
            green_time.initial_green(),
            options.rate_window(),
        )?;

        info!(
            junction = %id,
            streams = table.stream_count(),
            phases = table.len(),
            green_time = green_time.name(),
            scheduler = scheduler.name(),
            initial_phase,
            "signal state machine created"
        );

        Ok(Self {
            id,
            membership: table.membership_vectors(),
            table,
            green_time,
            scheduler,
            options,
            rng,
            state,
            history: GreenTimeHistory::default(),
        })
    }

    pub fn id(&self) -> &JunctionId {
        &self.id
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    pub fn state(&self) -> &JunctionRuntimeState {
        &self.state
    }

    pub fn history(&self) -> &GreenTimeHistory {
        &self.history
    }

    /// Advance by one tick of `dt` seconds.
    ///
    /// On error nothing the junction shows has changed; the failure is fatal
    /// for the run.
    pub fn tick<I: SignalIo + ?Sized>(&mut self, io: &I) -> SimResult<()> {
        match self.state.signal {
            SignalPhase::Amber if timer_expired(self.state.amber_timer) => self.open_green(io)?,
            SignalPhase::Amber => self.state.amber_timer -= self.options.dt,
            SignalPhase::Green if timer_expired(self.state.green_timer) => self.switch(io)?,
            SignalPhase::Green => {
                let observations = self.observe_open_lanes(io)?;
                self.state.green_timer -= self.options.dt;
                self.state.apply_observations(observations, self.options.dt);
                trace!(
                    junction = %self.id,
                    green_timer = self.state.green_timer,
                    actual_cleared = self.state.actual_cleared,
                    "green tick"
                );
            }
        }
        self.state.tick += 1;
        Ok(())
    }

    fn collaborator(&self) -> impl Fn(CollaboratorError) -> SimError + '_ {
        move |source| SimError::Collaborator {
            junction: self.id.clone(),
            source,
        }
    }

    /// Amber elapsed: show the pending green and start observing its lanes.
    fn open_green<I: SignalIo + ?Sized>(&mut self, io: &I) -> SimResult<()> {
        let phase = self.state.next_phase;
        let open_lanes = self.table.open_lane_slots(phase);
        let lanes = self.table.lane_index();
        let snapshots = open_lanes
            .iter()
            .map(|&slot| io.vehicle_ids(lanes.incoming_lane(slot)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(self.collaborator())?;

        io.set_signal_state(&self.id, &self.state.next_lights)
            .map_err(self.collaborator())?;

        debug!(
            junction = %self.id,
            phase,
            lights = %self.state.next_lights,
            green_timer = self.state.green_timer,
            "green"
        );
        let state = &mut self.state;
        state.current_phase = phase;
        state.current_lights = state.next_lights.clone();
        state.open_lanes = open_lanes;
        state.snapshots = snapshots;
        state.signal = SignalPhase::Green;
        Ok(())
    }

    /// Green elapsed: run the switching pipeline.
    fn switch<I: SignalIo + ?Sized>(&mut self, io: &I) -> SimResult<()> {
        // 1-3: refresh sampled data
        let queues = self.sample_queues(io)?;
        let capacities = self.sample_capacities(io)?;
        let observations = self.observe_open_lanes(io)?;
        self.state.queues = queues;
        self.state.capacities = capacities;
        self.state.apply_observations(observations, self.options.dt);

        let staged = self.stage_switch()?;

        // 9: actuate, then commit
        io.set_signal_state(&self.id, &staged.amber_lights)
            .map_err(self.collaborator())?;

        debug!(
            junction = %self.id,
            ending = self.state.current_phase,
            next = staged.next_phase,
            green_time = staged.record.green_time,
            green_timer = staged.green_timer,
            amber = %staged.amber_lights,
            target_cleared = staged.target_cleared,
            actual_cleared = self.state.actual_cleared,
            "phase switch"
        );

        let state = &mut self.state;
        state.green_times = staged.green_times;
        state.next_phase = staged.next_phase;
        state.next_lights = staged.next_lights;
        state.current_lights = staged.amber_lights;
        state.green_timer = staged.green_timer;
        state.amber_timer = staged.amber_timer;
        state.target_cleared = staged.target_cleared;
        state.actual_cleared = 0.0;
        state.signal = SignalPhase::Amber;
        self.history.push(staged.record);
        Ok(())
    }

    /// Steps 4 to 8, without touching the committed state.
    fn stage_switch(&mut self) -> SimResult<StagedSwitch> {
        let ending = self.state.current_phase;

        // 4: next green time for every stream of the ending phase
        let lane_rates: Vec<&LaneRates> = self
            .state
            .open_lanes
            .iter()
            .map(|&slot| &self.state.lane_rates[slot])
            .collect();
        let feedback = ClearanceFeedback {
            target_cleared: self.state.target_cleared,
            actual_cleared: self.state.actual_cleared,
            current_green: self.state.green_times[ending],
        };
        let new_green = self.green_time.compute_next_green(&feedback, &lane_rates);
        let mut green_times = self.state.green_times.clone();
        for stream in self.table.members(ending) {
            green_times[stream] = new_green;
        }
        let record = GreenTimeRecord {
            tick: self.state.tick,
            phase: ending,
            lanes: self
                .state
                .open_lanes
                .iter()
                .map(|&slot| self.table.lane_index().incoming_lane(slot).clone())
                .collect::<Vec<LaneId>>(),
            green_time: new_green,
        };

        // 5: next phase
        let input = SchedulerInput {
            phases: &self.membership,
            queues: &self.state.queues,
            capacities: &self.state.capacities,
            downstream: self.table.lane_index().outgoing_slots(),
        };
        let next_phase = self.scheduler.choose_phase(&input, &mut self.rng)?;

        // 6: clearance target
        let target_cleared = self
            .table
            .members(next_phase)
            .map(|s| self.state.queues[s])
            .sum::<f64>()
            * self.options.removal_fraction;

        // 7-8: timers and light strings
        let next_lights = self.table.light_string(next_phase).clone();
        let amber = amber::synthesize(&self.state.current_lights, &next_lights)?;
        let amber_timer = amber.duration(self.options.amber_ticks, self.options.dt);

        Ok(StagedSwitch {
            next_phase,
            next_lights,
            amber_lights: amber.lights,
            green_timer: green_times[next_phase],
            amber_timer,
            target_cleared,
            green_times,
            record,
        })
    }

    /// Vehicles per stream; a lane's count is shared evenly by its streams.
    fn sample_queues<I: SignalIo + ?Sized>(&self, io: &I) -> SimResult<Vec<f64>> {
        let lanes = self.table.lane_index();
        let mut queues = vec![0.0; self.table.stream_count()];
        for slot in 0..lanes.incoming_count() {
            let count = io
                .queue_length(lanes.incoming_lane(slot))
                .map_err(self.collaborator())?;
            let members = lanes.streams_on_incoming(slot);
            let share = f64::from(count) / members.len() as f64;
            for &stream in members {
                queues[stream] = share;
            }
        }
        Ok(queues)
    }

    /// Free downstream spaces per stream, from its outgoing lane.
    fn sample_capacities<I: SignalIo + ?Sized>(&self, io: &I) -> SimResult<Vec<f64>> {
        let lanes = self.table.lane_index();
        let mut capacities = vec![0.0; self.table.stream_count()];
        for slot in 0..lanes.outgoing_count() {
            let room = io
                .downstream_capacity(lanes.outgoing_lane(slot))
                .map_err(self.collaborator())?;
            for &stream in lanes.streams_into_outgoing(slot) {
                capacities[stream] = room as f64;
            }
        }
        Ok(capacities)
    }

    /// Compare each open lane's vehicles with its previous snapshot.
    fn observe_open_lanes<I: SignalIo + ?Sized>(
        &self,
        io: &I,
    ) -> SimResult<Vec<LaneObservation>> {
        let lanes = self.table.lane_index();
        let mut observations = Vec::with_capacity(self.state.open_lanes.len());
        for (position, &slot) in self.state.open_lanes.iter().enumerate() {
            let present: HashSet<_> = io
                .vehicle_ids(lanes.incoming_lane(slot))
                .map_err(self.collaborator())?;
            let previous = &self.state.snapshots[position];
            observations.push(LaneObservation {
                position,
                departed: previous.difference(&present).count(),
                arrived: present.difference(previous).count(),
                present,
            });
        }
        Ok(observations)
    }
}
