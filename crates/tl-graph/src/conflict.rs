//! Conflict-graph derivation: right-of-way topology to phases.
//!
//! Three passes:
//! 1. **Pairwise resolution**: every ordered pair (i, j) gets a compatibility
//!    bit and the light stream j would show while i is open.
//! 2. **Lane squashing**: streams behind one signal head must agree, so each
//!    (lane A × lane B) block collapses to all-compatible only if every entry
//!    already is, else to all-incompatible.
//! 3. **Column resolution**: each stream shows the dominant light among the
//!    proposals of all streams it stays compatible with (`r` over `g` over
//!    `G`); entries outside the squashed matrix are red.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::GraphError;
use crate::indexing::LaneIndex;
use crate::light::{Light, LightString};
use crate::phase::{CompatibilityMatrix, PhaseTable};
use crate::topology::{Direction, JunctionTopology};
use crate::validate;

/// How foe pairs are turned into compatibility before squashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionModel {
    /// Foes with right-of-way in either direction are resolved by the turning
    /// directions of both streams.
    #[default]
    Directional,
    /// Every foe pair is incompatible; priorities and directions are ignored.
    FoesOnly,
}

/// Derives the compatibility matrix and phase set of a junction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictGraphBuilder {
    pub model: ResolutionModel,
}

impl ConflictGraphBuilder {
    pub fn new(model: ResolutionModel) -> Self {
        Self { model }
    }

    /// Run all three passes and package the result.
    pub fn derive(&self, topology: &JunctionTopology) -> Result<PhaseTable, GraphError> {
        let (pairwise, lights) = self.resolve_pairs(topology)?;
        let lanes = LaneIndex::from_streams(topology.streams());
        let squashed = squash(&pairwise, lanes.incoming_groups());
        validate::validate_squashed(&squashed, &lanes)?;
        let light_strings = resolve_columns(&squashed, &lights);

        let table = PhaseTable::from_parts(topology.streams().to_vec(), squashed, light_strings);

        info!(
            streams = table.stream_count(),
            signal_heads = lanes.incoming_count(),
            model = ?self.model,
            "derived phase table"
        );
        if !table.compatibility().is_symmetric() {
            warn!("compatibility matrix is not symmetric; the foe matrix is likely one-sided");
        }
        for phase in table.phases() {
            let conflicts = table.conflicting_members(phase.index);
            if !conflicts.is_empty() {
                warn!(
                    phase = phase.index,
                    lights = %phase.lights,
                    ?conflicts,
                    "phase opens streams that are incompatible with each other"
                );
            }
        }

        Ok(table)
    }

    /// Pass 1: pre-squash compatibility and per-pair light proposals.
    ///
    /// `lights[i][j]` is the light for stream j while i is open.
    pub fn resolve_pairs(
        &self,
        topology: &JunctionTopology,
    ) -> Result<(CompatibilityMatrix, Vec<Vec<Light>>), GraphError> {
        let n = topology.len();
        let mut compat = CompatibilityMatrix::new(n);
        let mut lights = vec![vec![Light::Red; n]; n];

        for i in 0..n {
            for j in 0..n {
                let (compatible, light) = self.resolve_pair(topology, i, j)?;
                compat.set(i, j, compatible);
                lights[i][j] = light;
            }
        }

        Ok((compat, lights))
    }

    fn resolve_pair(
        &self,
        topology: &JunctionTopology,
        i: usize,
        j: usize,
    ) -> Result<(bool, Light), GraphError> {
        if !topology.are_foes(i, j) {
            return Ok((true, Light::GreenMajor));
        }
        match self.model {
            ResolutionModel::FoesOnly => Ok((false, Light::Red)),
            ResolutionModel::Directional => {
                if !(topology.has_priority(i, j) || topology.has_priority(j, i)) {
                    return Err(GraphError::UnresolvedConflict { i, j });
                }
                let streams = topology.streams();
                Ok(directional_rule(streams[i].direction, streams[j].direction))
            }
        }
    }
}

/// Precedence table for conflicting streams, keyed on (reference, other).
pub fn directional_rule(reference: Direction, other: Direction) -> (bool, Light) {
    use Direction::*;
    match (reference, other) {
        (Right, Left) => (true, Light::GreenMinor),
        (Right, Through) | (Right, Right) => (false, Light::Red),
        (Through, Through) | (Through, Right) => (false, Light::Red),
        (Through, Left) => (true, Light::GreenMinor),
        // The opposing flow must itself give way
        (Left, Through) | (Left, Right) => (true, Light::GreenMajor),
        (Left, Left) => (false, Light::Red),
    }
}

/// Pass 2: collapse every lane-by-lane block to all-true or all-false.
pub fn squash(pairwise: &CompatibilityMatrix, groups: &[Vec<usize>]) -> CompatibilityMatrix {
    let mut squashed = CompatibilityMatrix::new(pairwise.size());
    for lane_a in groups {
        for lane_b in groups {
            let all_compatible = lane_a
                .iter()
                .all(|&i| lane_b.iter().all(|&j| pairwise.get(i, j)));
            if all_compatible {
                for &i in lane_a {
                    for &j in lane_b {
                        squashed.set(i, j, true);
                    }
                }
            }
        }
    }
    squashed
}

/// Pass 3: one light per stream, placed in every row that opens it.
pub fn resolve_columns(squashed: &CompatibilityMatrix, lights: &[Vec<Light>]) -> Vec<LightString> {
    let n = squashed.size();
    let stream_lights: Vec<Light> = (0..n)
        .map(|j| {
            let proposals = (0..n)
                .filter(|&k| squashed.get(j, k))
                .map(|k| lights[k][j]);
            // Diagonal survives validation, so there is always a proposal
            Light::dominant(proposals).unwrap_or(Light::Red)
        })
        .collect();

    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if squashed.get(i, j) {
                        stream_lights[j]
                    } else {
                        Light::Red
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TopologyBuilder;

    fn strings(table: &PhaseTable) -> Vec<String> {
        table.phases().iter().map(|p| p.lights.to_string()).collect()
    }

    #[test]
    fn non_foes_are_fully_green() {
        let mut builder = TopologyBuilder::new();
        builder.add_stream("a", "x", Direction::Through);
        builder.add_stream("b", "y", Direction::Through);
        let topology = builder.build().unwrap();

        let table = ConflictGraphBuilder::default().derive(&topology).unwrap();
        assert!(table.compatibility().row(0).iter().all(|&c| c));
        assert_eq!(strings(&table), vec!["GG", "GG"]);
    }

    #[test]
    fn crossing_throughs_are_exclusive() {
        let mut builder = TopologyBuilder::new();
        let ns = builder.add_stream("n", "s", Direction::Through);
        let ew = builder.add_stream("e", "w", Direction::Through);
        builder.set_priority(ns, ew);
        let topology = builder.build().unwrap();

        let table = ConflictGraphBuilder::default().derive(&topology).unwrap();
        assert_eq!(strings(&table), vec!["Gr", "rG"]);
    }

    #[test]
    fn opposing_left_turn_gives_way() {
        // Through (0) and an opposing left turn (1) may run together; the
        // left turner yields.
        let mut builder = TopologyBuilder::new();
        let through = builder.add_stream("n", "s", Direction::Through);
        let left = builder.add_stream("s", "e", Direction::Left);
        builder.set_priority(through, left);
        let topology = builder.build().unwrap();

        let table = ConflictGraphBuilder::default().derive(&topology).unwrap();
        assert_eq!(strings(&table), vec!["Gg", "Gg"]);
    }

    #[test]
    fn unresolved_foes_fail_fast() {
        let mut builder = TopologyBuilder::new();
        builder.add_stream("n", "s", Direction::Through);
        builder.add_stream("e", "w", Direction::Through);
        builder.set_foes(0, 1);
        let topology = builder.build().unwrap();

        let err = ConflictGraphBuilder::default().derive(&topology).unwrap_err();
        assert_eq!(err, GraphError::UnresolvedConflict { i: 0, j: 1 });
    }

    #[test]
    fn foes_only_model_ignores_missing_priority() {
        let mut builder = TopologyBuilder::new();
        builder.add_stream("n", "s", Direction::Through);
        builder.add_stream("e", "w", Direction::Through);
        builder.set_foes(0, 1);
        let topology = builder.build().unwrap();

        let table = ConflictGraphBuilder::new(ResolutionModel::FoesOnly)
            .derive(&topology)
            .unwrap();
        assert_eq!(strings(&table), vec!["Gr", "rG"]);
    }

    #[test]
    fn shared_lane_inherits_conflicts_of_its_neighbour() {
        // Lane "n" carries a through (0) and a right turn (1). Only the right
        // turn conflicts with the east through (2), yet the whole head must
        // stop while 2 runs.
        let mut builder = TopologyBuilder::new();
        builder.add_stream("n", "s", Direction::Through);
        let right = builder.add_stream("n", "w", Direction::Right);
        let east = builder.add_stream("e", "w2", Direction::Through);
        builder.set_priority(east, right);
        let topology = builder.build().unwrap();

        let table = ConflictGraphBuilder::default().derive(&topology).unwrap();
        let m = table.compatibility();
        assert!(!m.get(0, 2) && !m.get(2, 0));
        assert_eq!(m.row(0), m.row(1));
        assert_eq!(strings(&table), vec!["GGr", "GGr", "rrG"]);
    }

    #[test]
    fn conflicting_streams_on_one_lane_are_rejected() {
        let mut builder = TopologyBuilder::new();
        let a = builder.add_stream("n", "s", Direction::Through);
        let b = builder.add_stream("n", "w", Direction::Through);
        builder.set_priority(a, b);
        let topology = builder.build().unwrap();

        let err = ConflictGraphBuilder::default().derive(&topology).unwrap_err();
        assert!(matches!(err, GraphError::LaneSelfConflict { .. }));
    }

    #[test]
    fn directional_table() {
        use Direction::*;
        assert_eq!(directional_rule(Right, Left), (true, Light::GreenMinor));
        assert_eq!(directional_rule(Right, Through), (false, Light::Red));
        assert_eq!(directional_rule(Through, Right), (false, Light::Red));
        assert_eq!(directional_rule(Through, Left), (true, Light::GreenMinor));
        assert_eq!(directional_rule(Left, Through), (true, Light::GreenMajor));
        assert_eq!(directional_rule(Left, Right), (true, Light::GreenMajor));
        assert_eq!(directional_rule(Left, Left), (false, Light::Red));
    }
}
