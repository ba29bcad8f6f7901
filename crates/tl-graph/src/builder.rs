//! Incremental topology builder.

use tl_core::LaneId;

use crate::error::GraphError;
use crate::topology::{Direction, JunctionTopology, Stream};

/// Builder for constructing a junction topology incrementally.
///
/// Use `add_stream` to declare movements in index order, then `set_foes` and
/// `set_priority` to record relations, then call `build()` to validate and
/// freeze it into an immutable `JunctionTopology`.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    streams: Vec<Stream>,
    foes: Vec<(usize, usize)>,
    priority: Vec<(usize, usize)>,
}

impl TopologyBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream and return its index.
    pub fn add_stream(
        &mut self,
        incoming_lane: impl Into<LaneId>,
        outgoing_lane: impl Into<LaneId>,
        direction: Direction,
    ) -> usize {
        let index = self.streams.len();
        self.streams.push(Stream {
            index,
            incoming_lane: incoming_lane.into(),
            outgoing_lane: outgoing_lane.into(),
            direction,
        });
        index
    }

    /// Mark two streams as physical foes (symmetric).
    pub fn set_foes(&mut self, a: usize, b: usize) -> &mut Self {
        self.foes.push((a, b));
        self.foes.push((b, a));
        self
    }

    /// Mark `over` as having right-of-way over `under`. Also records the pair
    /// as foes, since priority only matters between conflicting movements.
    pub fn set_priority(&mut self, over: usize, under: usize) -> &mut Self {
        self.priority.push((over, under));
        self.set_foes(over, under)
    }

    /// Build and validate the topology.
    pub fn build(self) -> Result<JunctionTopology, GraphError> {
        let n = self.streams.len();
        let foes = Self::dense(n, &self.foes)?;
        let priority = Self::dense(n, &self.priority)?;
        JunctionTopology::new(self.streams, foes, priority)
    }

    fn dense(n: usize, pairs: &[(usize, usize)]) -> Result<Vec<Vec<bool>>, GraphError> {
        let mut matrix = vec![vec![false; n]; n];
        for &(i, j) in pairs {
            if i >= n || j >= n {
                return Err(GraphError::MatrixShape {
                    what: "relation",
                    expected: n,
                    found: i.max(j) + 1,
                });
            }
            matrix[i][j] = true;
        }
        Ok(matrix)
    }
}
