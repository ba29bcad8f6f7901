//! Topology and phase-matrix validation.

use crate::error::GraphError;
use crate::indexing::LaneIndex;
use crate::phase::CompatibilityMatrix;
use crate::topology::Stream;

/// Validate raw topology: ordering, matrix shapes, no self-conflicts.
pub(crate) fn validate_topology(
    streams: &[Stream],
    foes: &[Vec<bool>],
    priority: &[Vec<bool>],
) -> Result<(), GraphError> {
    if streams.is_empty() {
        return Err(GraphError::EmptyJunction);
    }

    // Indices double as positions in every per-stream vector
    for (position, stream) in streams.iter().enumerate() {
        if stream.index != position {
            return Err(GraphError::StreamIndexMismatch {
                position,
                index: stream.index,
            });
        }
    }

    let n = streams.len();
    check_square("foe", foes, n)?;
    check_square("priority", priority, n)?;

    for (i, row) in foes.iter().enumerate() {
        if row[i] {
            return Err(GraphError::SelfConflict { stream: i });
        }
    }

    Ok(())
}

fn check_square(what: &'static str, matrix: &[Vec<bool>], n: usize) -> Result<(), GraphError> {
    if matrix.len() != n {
        return Err(GraphError::MatrixShape {
            what,
            expected: n,
            found: matrix.len(),
        });
    }
    if let Some(row) = matrix.iter().find(|row| row.len() != n) {
        return Err(GraphError::MatrixShape {
            what,
            expected: n,
            found: row.len(),
        });
    }
    Ok(())
}

/// Every stream must stay compatible with itself after squashing; a lane whose
/// own streams conflict would clear its diagonal block.
pub(crate) fn validate_squashed(
    squashed: &CompatibilityMatrix,
    lanes: &LaneIndex,
) -> Result<(), GraphError> {
    for i in 0..squashed.size() {
        if !squashed.get(i, i) {
            let slot = lanes.incoming_slot(i);
            return Err(GraphError::LaneSelfConflict {
                lane: lanes.incoming_lane(slot).clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Direction;
    use tl_core::LaneId;

    fn stream(index: usize) -> Stream {
        Stream {
            index,
            incoming_lane: LaneId::new(format!("in_{index}")),
            outgoing_lane: LaneId::new(format!("out_{index}")),
            direction: Direction::Through,
        }
    }

    #[test]
    fn validate_empty_junction() {
        assert_eq!(
            validate_topology(&[], &[], &[]),
            Err(GraphError::EmptyJunction)
        );
    }

    #[test]
    fn validate_out_of_order_indices() {
        let streams = vec![stream(1), stream(0)];
        let m = vec![vec![false; 2]; 2];
        assert_eq!(
            validate_topology(&streams, &m, &m),
            Err(GraphError::StreamIndexMismatch {
                position: 0,
                index: 1
            })
        );
    }

    #[test]
    fn validate_ragged_priority_matrix() {
        let streams = vec![stream(0), stream(1)];
        let foes = vec![vec![false; 2]; 2];
        let priority = vec![vec![false; 2], vec![false; 3]];
        let result = validate_topology(&streams, &foes, &priority);
        assert!(matches!(
            result,
            Err(GraphError::MatrixShape {
                what: "priority",
                ..
            })
        ));
    }

    #[test]
    fn validate_self_foe() {
        let streams = vec![stream(0), stream(1)];
        let foes = vec![vec![false, false], vec![false, true]];
        let priority = vec![vec![false; 2]; 2];
        assert_eq!(
            validate_topology(&streams, &foes, &priority),
            Err(GraphError::SelfConflict { stream: 1 })
        );
    }
}
