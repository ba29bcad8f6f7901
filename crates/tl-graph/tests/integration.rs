//! Integration tests for tl-graph.

use proptest::prelude::*;
use tl_graph::{ConflictGraphBuilder, Direction, GraphError, ResolutionModel, TopologyBuilder};

/// Four-arm crossroad, one lane per arm carrying through + right (right-hand
/// drive numbering: 0..2 north, 2..4 east, 4..6 south, 6..8 west).
fn crossroad() -> tl_graph::JunctionTopology {
    let mut b = TopologyBuilder::new();
    let n_s = b.add_stream("n_in", "s_out", Direction::Through);
    let n_r = b.add_stream("n_in", "w_out", Direction::Right);
    let e_s = b.add_stream("e_in", "w_out", Direction::Through);
    let e_r = b.add_stream("e_in", "n_out", Direction::Right);
    let s_s = b.add_stream("s_in", "n_out", Direction::Through);
    let s_r = b.add_stream("s_in", "e_out", Direction::Right);
    let w_s = b.add_stream("w_in", "e_out", Direction::Through);
    let w_r = b.add_stream("w_in", "s_out", Direction::Right);

    // Crossing throughs
    for (a, c) in [(n_s, e_s), (n_s, w_s), (s_s, e_s), (s_s, w_s)] {
        b.set_priority(a, c);
    }
    // Right turns cut across the opposing through
    b.set_priority(s_s, n_r);
    b.set_priority(n_s, s_r);
    b.set_priority(w_s, e_r);
    b.set_priority(e_s, w_r);
    b.build().unwrap()
}

#[test]
fn shared_right_turn_lanes_run_one_arm_at_a_time() {
    let table = ConflictGraphBuilder::default().derive(&crossroad()).unwrap();

    assert_eq!(table.len(), 8);
    let distinct: std::collections::BTreeSet<String> = table
        .phases()
        .iter()
        .map(|p| p.lights.to_string())
        .collect();
    // A right turn sharing a head with the through movement blocks the
    // opposing arm, so each arm ends up alone.
    let expected: std::collections::BTreeSet<String> =
        ["GGrrrrrr", "rrGGrrrr", "rrrrGGrr", "rrrrrrGG"]
            .into_iter()
            .map(String::from)
            .collect();
    assert_eq!(distinct, expected);
    for phase in table.phases() {
        let open: Vec<usize> = phase.lights.open_streams().collect();
        for &a in &open {
            for &b in &open {
                assert!(table.compatibility().get(a, b), "{a} and {b} open together");
            }
        }
    }
}

#[test]
fn crossroad_rows_agree_per_signal_head() {
    let table = ConflictGraphBuilder::default().derive(&crossroad()).unwrap();
    let lanes = table.lane_index();
    for slot in 0..lanes.incoming_count() {
        let members = lanes.streams_on_incoming(slot);
        for &m in members {
            assert_eq!(
                table.compatibility().row(m),
                table.compatibility().row(members[0])
            );
        }
    }
}

#[test]
fn missing_priority_is_a_configuration_error() {
    let mut b = TopologyBuilder::new();
    b.add_stream("a", "x", Direction::Left);
    b.add_stream("b", "y", Direction::Left);
    b.set_foes(0, 1);
    let topology = b.build().unwrap();

    assert_eq!(
        ConflictGraphBuilder::new(ResolutionModel::Directional)
            .derive(&topology)
            .unwrap_err(),
        GraphError::UnresolvedConflict { i: 0, j: 1 }
    );
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Through),
        Just(Direction::Left),
        Just(Direction::Right)
    ]
}

prop_compose! {
    fn random_topology()(n in 1usize..9)(
        lanes in prop::collection::vec(0usize..4, n),
        dirs in prop::collection::vec(direction_strategy(), n),
        foes in prop::collection::vec(any::<bool>(), n * n),
        n in Just(n),
    ) -> tl_graph::JunctionTopology {
        let mut b = TopologyBuilder::new();
        for i in 0..n {
            b.add_stream(format!("in_{}", lanes[i]), format!("out_{i}"), dirs[i]);
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if foes[i * n + j] {
                    b.set_priority(i, j);
                }
            }
        }
        b.build().unwrap()
    }
}

proptest! {
    #[test]
    fn squashed_matrix_invariants(topology in random_topology()) {
        for model in [ResolutionModel::Directional, ResolutionModel::FoesOnly] {
            match ConflictGraphBuilder::new(model).derive(&topology) {
                Ok(table) => {
                    let m = table.compatibility();
                    prop_assert!(m.is_symmetric());
                    for i in 0..m.size() {
                        prop_assert!(m.get(i, i));
                    }
                    let lanes = table.lane_index();
                    for slot in 0..lanes.incoming_count() {
                        let members = lanes.streams_on_incoming(slot);
                        for &s in members {
                            prop_assert_eq!(m.row(s), m.row(members[0]));
                        }
                    }
                    for phase in table.phases() {
                        for (j, light) in phase.lights.iter().enumerate() {
                            prop_assert_eq!(phase.members[j], light.is_open());
                        }
                    }
                }
                Err(err) => {
                    let lane_conflict = matches!(err, GraphError::LaneSelfConflict { .. });
                    prop_assert!(lane_conflict, "unexpected error {}", err);
                }
            }
        }
    }
}
