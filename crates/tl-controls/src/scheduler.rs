//! Phase schedulers (queue controllers).
//!
//! A scheduler scores every phase from per-stream queue and downstream
//! capacity vectors and opens a best-scoring one. Ties go to a uniformly
//! random maximiser so that equally loaded approaches take turns over a long
//! run instead of the lowest index always winning.

use std::fmt;

use rand::{Rng, RngCore};
use tl_core::{Tolerances, nearly_equal};

use crate::error::{ControlError, ControlResult};

/// Snapshot a scheduler decides on. All per-stream slices share one length.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerInput<'a> {
    /// Membership vector per phase (`phases[k][s]`: stream s is green in k).
    pub phases: &'a [Vec<bool>],
    /// Vehicles queued per stream.
    pub queues: &'a [f64],
    /// Free downstream spaces per stream (its outgoing lane's).
    pub capacities: &'a [f64],
    /// Outgoing-lane slot each stream feeds; streams with equal slots share
    /// downstream capacity.
    pub downstream: &'a [usize],
}

impl SchedulerInput<'_> {
    pub fn stream_count(&self) -> usize {
        self.queues.len()
    }

    /// Reject empty phase sets and ragged vectors.
    pub fn validate(&self) -> ControlResult<()> {
        if self.phases.is_empty() {
            return Err(ControlError::EmptyPhaseSet);
        }
        let n = self.stream_count();
        check_len("capacities", n, self.capacities.len())?;
        check_len("downstream", n, self.downstream.len())?;
        for phase in self.phases {
            check_len("phase membership", n, phase.len())?;
        }
        Ok(())
    }

    fn members(&self, phase: usize) -> impl Iterator<Item = usize> + '_ {
        self.phases[phase]
            .iter()
            .enumerate()
            .filter(|&(_, &open)| open)
            .map(|(s, _)| s)
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> ControlResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ControlError::DimensionMismatch {
            what,
            expected,
            found,
        })
    }
}

/// A policy choosing the next phase.
pub trait Scheduler: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// One score per phase.
    fn scores(&self, input: &SchedulerInput<'_>) -> ControlResult<Vec<f64>>;

    /// Index of a best-scoring phase, ties broken uniformly at random.
    fn choose_phase(
        &self,
        input: &SchedulerInput<'_>,
        rng: &mut dyn RngCore,
    ) -> ControlResult<usize> {
        let scores = self.scores(input)?;
        argmax_random(&scores, rng)
    }
}

/// Uniform choice among all indices whose score is (nearly) the maximum.
pub fn argmax_random(scores: &[f64], rng: &mut dyn RngCore) -> ControlResult<usize> {
    let best = scores
        .iter()
        .copied()
        .filter(|s| !s.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    let ties: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s == best || nearly_equal(s, best, Tolerances::default()))
        .map(|(k, _)| k)
        .collect();

    match ties.len() {
        0 => Err(ControlError::EmptyPhaseSet),
        1 => Ok(ties[0]),
        n => Ok(ties[rng.gen_range(0..n)]),
    }
}

/// Total queue released by each phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxWeight;

impl Scheduler for MaxWeight {
    fn name(&self) -> &'static str {
        "max_weight"
    }

    fn scores(&self, input: &SchedulerInput<'_>) -> ControlResult<Vec<f64>> {
        input.validate()?;
        Ok((0..input.phases.len())
            .map(|k| input.members(k).map(|s| input.queues[s]).sum())
            .collect())
    }
}

/// MaxWeight ignoring streams with no room downstream (capacity below one
/// vehicle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CongestionAware;

impl Scheduler for CongestionAware {
    fn name(&self) -> &'static str {
        "congestion_aware"
    }

    fn scores(&self, input: &SchedulerInput<'_>) -> ControlResult<Vec<f64>> {
        input.validate()?;
        Ok((0..input.phases.len())
            .map(|k| {
                input
                    .members(k)
                    .filter(|&s| input.capacities[s] >= 1.0)
                    .map(|s| input.queues[s])
                    .sum()
            })
            .collect())
    }
}

/// Scores each phase by the demand it can actually discharge: a stream's
/// queue is capped by the room left on its outgoing lane, and that room is
/// split among the phase members feeding the same lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemandOptimizing;

impl DemandOptimizing {
    fn bounded_demand(input: &SchedulerInput<'_>, phase: usize, stream: usize) -> f64 {
        let slot = input.downstream[stream];
        let sharing = input
            .members(phase)
            .filter(|&m| input.downstream[m] == slot)
            .count();
        if sharing == 0 {
            return 0.0;
        }
        let room = input.capacities[stream].max(0.0);
        input.queues[stream].min(room) / sharing as f64
    }
}

impl Scheduler for DemandOptimizing {
    fn name(&self) -> &'static str {
        "demand_optimizing"
    }

    fn scores(&self, input: &SchedulerInput<'_>) -> ControlResult<Vec<f64>> {
        input.validate()?;
        Ok((0..input.phases.len())
            .map(|k| {
                input
                    .members(k)
                    .map(|s| Self::bounded_demand(input, k, s))
                    .sum()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn non_conflicting_pair_opens_both() {
        let phases = vec![vec![true, true], vec![true, true]];
        let input = SchedulerInput {
            phases: &phases,
            queues: &[5.0, 2.0],
            capacities: &[10.0, 10.0],
            downstream: &[0, 1],
        };
        let k = MaxWeight.choose_phase(&input, &mut rng()).unwrap();
        assert!(phases[k].iter().all(|&open| open));
    }

    #[test]
    fn max_weight_picks_heaviest() {
        let phases = vec![vec![true, false, false], vec![false, true, true]];
        let input = SchedulerInput {
            phases: &phases,
            queues: &[4.0, 2.0, 3.0],
            capacities: &[1.0; 3],
            downstream: &[0, 1, 2],
        };
        assert_eq!(MaxWeight.scores(&input).unwrap(), vec![4.0, 5.0]);
        assert_eq!(MaxWeight.choose_phase(&input, &mut rng()).unwrap(), 1);
    }

    #[test]
    fn ties_are_not_always_lowest_index() {
        let phases = vec![vec![true, false], vec![false, true]];
        let input = SchedulerInput {
            phases: &phases,
            queues: &[3.0, 3.0],
            capacities: &[1.0, 1.0],
            downstream: &[0, 1],
        };
        let mut r = rng();
        let mut seen = [false; 2];
        for _ in 0..64 {
            seen[MaxWeight.choose_phase(&input, &mut r).unwrap()] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn congestion_aware_skips_blocked_streams() {
        // Phase 0 holds only the blocked stream; phase 1 has a small queue.
        let phases = vec![vec![true, false], vec![false, true]];
        let input = SchedulerInput {
            phases: &phases,
            queues: &[50.0, 1.0],
            capacities: &[0.0, 8.0],
            downstream: &[0, 1],
        };
        assert_eq!(CongestionAware.scores(&input).unwrap(), vec![0.0, 1.0]);
        let mut r = rng();
        for _ in 0..16 {
            assert_eq!(CongestionAware.choose_phase(&input, &mut r).unwrap(), 1);
        }
        // MaxWeight would have opened the blocked stream
        assert_eq!(MaxWeight.choose_phase(&input, &mut r).unwrap(), 0);
    }

    #[test]
    fn demand_optimizing_splits_shared_outlet() {
        // Streams 0 and 1 both feed outlet 0 with room for 4 vehicles.
        let phases = vec![vec![true, true, false], vec![false, false, true]];
        let input = SchedulerInput {
            phases: &phases,
            queues: &[10.0, 10.0, 3.0],
            capacities: &[4.0, 4.0, 20.0],
            downstream: &[0, 0, 1],
        };
        // Phase 0: 2 * min(10, 4) / 2 = 4; phase 1: min(3, 20) = 3
        assert_eq!(DemandOptimizing.scores(&input).unwrap(), vec![4.0, 3.0]);
    }

    #[test]
    fn demand_optimizing_negative_capacity_counts_as_full() {
        let phases = vec![vec![true]];
        let input = SchedulerInput {
            phases: &phases,
            queues: &[10.0],
            capacities: &[-3.0],
            downstream: &[0],
        };
        assert_eq!(DemandOptimizing.scores(&input).unwrap(), vec![0.0]);
    }

    #[test]
    fn empty_phase_set_rejected() {
        let input = SchedulerInput {
            phases: &[],
            queues: &[],
            capacities: &[],
            downstream: &[],
        };
        assert_eq!(
            MaxWeight.choose_phase(&input, &mut rng()).unwrap_err(),
            ControlError::EmptyPhaseSet
        );
    }

    #[test]
    fn ragged_input_rejected() {
        let phases = vec![vec![true, false]];
        let input = SchedulerInput {
            phases: &phases,
            queues: &[1.0, 2.0],
            capacities: &[1.0],
            downstream: &[0, 1],
        };
        assert!(matches!(
            DemandOptimizing.scores(&input),
            Err(ControlError::DimensionMismatch { what: "capacities", .. })
        ));
    }
}
