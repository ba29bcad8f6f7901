//! Intersection registry: owns every junction's state machine and advances
//! them once per simulation tick.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tl_controls::{SharedGreenTimeController, SharedScheduler};
use tl_core::JunctionId;
use tl_graph::{ConflictGraphBuilder, JunctionTopology, PhaseTable};
use tracing::info;

use crate::error::{SimError, SimResult};
use crate::io::{SignalIo, TopologyProvider};
use crate::machine::{MachineOptions, SignalStateMachine};

/// Spreads the configured seed across junctions so that each gets its own
/// reproducible stream.
fn junction_seed(seed: u64, order: usize) -> u64 {
    seed ^ (order as u64)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Pull raw topology for one junction and validate it.
pub fn fetch_topology<P: TopologyProvider + ?Sized>(
    provider: &P,
    junction: &JunctionId,
) -> SimResult<JunctionTopology> {
    let collaborator = |source| SimError::Collaborator {
        junction: junction.clone(),
        source,
    };
    let streams = provider.get_streams(junction).map_err(collaborator)?;
    let foes = provider.get_foe_matrix(junction).map_err(collaborator)?;
    let priority = provider.get_priority_matrix(junction).map_err(collaborator)?;
    JunctionTopology::new(streams, foes, priority).map_err(|source| SimError::Topology {
        junction: junction.clone(),
        source,
    })
}

/// All controlled junctions, in registration order.
#[derive(Debug, Default)]
pub struct IntersectionRegistry {
    machines: Vec<SignalStateMachine>,
    by_id: HashMap<JunctionId, usize>,
}

impl IntersectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a junction with an already derived phase table.
    pub fn register(
        &mut self,
        id: JunctionId,
        table: PhaseTable,
        green_time: SharedGreenTimeController,
        scheduler: SharedScheduler,
        options: &MachineOptions,
    ) -> SimResult<()> {
        self.register_all(vec![(id, table)], &green_time, &scheduler, options)
    }

    /// Add several junctions with already derived phase tables.
    ///
    /// Either all of them are registered or, on error, none is.
    pub fn register_all(
        &mut self,
        junctions: Vec<(JunctionId, PhaseTable)>,
        green_time: &SharedGreenTimeController,
        scheduler: &SharedScheduler,
        options: &MachineOptions,
    ) -> SimResult<()> {
        let mut seen = HashSet::new();
        for (id, _) in &junctions {
            if self.by_id.contains_key(id) || !seen.insert(id) {
                return Err(SimError::DuplicateJunction {
                    junction: id.clone(),
                });
            }
        }

        let first = self.machines.len();
        let machines = junctions
            .into_iter()
            .enumerate()
            .map(|(offset, (id, table))| {
                let options = MachineOptions {
                    seed: junction_seed(options.seed, first + offset),
                    ..options.clone()
                };
                SignalStateMachine::new(id, table, green_time.clone(), scheduler.clone(), options)
            })
            .collect::<SimResult<Vec<_>>>()?;

        for machine in machines {
            let order = self.machines.len();
            info!(junction = %machine.id(), order, "junction registered");
            self.by_id.insert(machine.id().clone(), order);
            self.machines.push(machine);
        }
        Ok(())
    }

    /// Fetch topology for each junction, derive its phases and register it.
    ///
    /// All junctions are derived before any is registered, so any error
    /// leaves the registry untouched.
    pub fn register_from_provider<P: TopologyProvider + ?Sized>(
        &mut self,
        provider: &P,
        junctions: &[JunctionId],
        builder: &ConflictGraphBuilder,
        green_time: &SharedGreenTimeController,
        scheduler: &SharedScheduler,
        options: &MachineOptions,
    ) -> SimResult<()> {
        let tables = junctions
            .iter()
            .map(|id| {
                let topology = fetch_topology(provider, id)?;
                builder
                    .derive(&topology)
                    .map_err(|source| SimError::Topology {
                        junction: id.clone(),
                        source,
                    })
            })
            .collect::<SimResult<Vec<_>>>()?;

        self.register_all(
            junctions.iter().cloned().zip(tables).collect(),
            green_time,
            scheduler,
            options,
        )
    }

    pub fn get(&self, id: &JunctionId) -> Option<&SignalStateMachine> {
        self.by_id.get(id).map(|&i| &self.machines[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalStateMachine> {
        self.machines.iter()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Advance every junction once, in registration order. Stops at the
    /// first failure.
    pub fn tick<I: SignalIo + ?Sized>(&mut self, io: &I) -> SimResult<()> {
        self.machines.iter_mut().try_for_each(|m| m.tick(io))
    }

    /// Advance every junction once, junctions in parallel.
    ///
    /// Each junction's own pipeline stays sequential. If several junctions
    /// fail, which error is returned is unspecified.
    pub fn tick_parallel<I: SignalIo + Sync + ?Sized>(&mut self, io: &I) -> SimResult<()> {
        self.machines.par_iter_mut().try_for_each(|m| m.tick(io))
    }
}
