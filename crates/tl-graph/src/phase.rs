//! Phase/stream model: the immutable per-junction output of phase derivation.

use crate::indexing::LaneIndex;
use crate::light::LightString;
use crate::topology::Stream;

/// Square boolean matrix; `get(i, j)` means stream j may be green while
/// stream i is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    n: usize,
    cells: Vec<bool>,
}

impl CompatibilityMatrix {
    /// All-incompatible matrix of size n.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![false; n * n],
        }
    }

    /// Build from nested rows (panics if not square).
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let n = rows.len();
        let mut matrix = Self::new(n);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n, "compatibility rows must be square");
            matrix.row_mut(i).copy_from_slice(row);
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        self.cells[i * self.n + j] = value;
    }

    pub fn row(&self, i: usize) -> &[bool] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    fn row_mut(&mut self, i: usize) -> &mut [bool] {
        let n = self.n;
        &mut self.cells[i * n..(i + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks(self.n.max(1)).take(self.n)
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// A set of streams shown green together, with its light setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    /// Row of the compatibility matrix; also the phase's reference stream.
    pub index: usize,
    /// Membership vector over streams.
    pub members: Vec<bool>,
    pub lights: LightString,
}

impl Phase {
    pub fn member_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, open)| **open)
            .map(|(i, _)| i)
    }

    pub fn contains(&self, stream: usize) -> bool {
        self.members.get(stream).copied().unwrap_or(false)
    }
}

/// Immutable phase set of one junction, fixed for the run.
#[derive(Debug, Clone)]
pub struct PhaseTable {
    pub(crate) streams: Vec<Stream>,
    pub(crate) lanes: LaneIndex,
    pub(crate) compatibility: CompatibilityMatrix,
    pub(crate) phases: Vec<Phase>,
}

impl PhaseTable {
    /// Assemble a table from an already squashed matrix and one light string
    /// per row. All three share the stream count.
    pub(crate) fn from_parts(
        streams: Vec<Stream>,
        compatibility: CompatibilityMatrix,
        lights: Vec<LightString>,
    ) -> Self {
        debug_assert_eq!(compatibility.size(), streams.len());
        debug_assert_eq!(lights.len(), streams.len());
        let lanes = LaneIndex::from_streams(&streams);
        let phases = lights
            .into_iter()
            .enumerate()
            .map(|(index, lights)| Phase {
                index,
                members: compatibility.row(index).to_vec(),
                lights,
            })
            .collect();
        Self {
            streams,
            lanes,
            compatibility,
            phases,
        }
    }

    /// Number of phases (equals the number of streams).
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn lane_index(&self) -> &LaneIndex {
        &self.lanes
    }

    pub fn compatibility(&self) -> &CompatibilityMatrix {
        &self.compatibility
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Get a phase (panics if out of bounds).
    pub fn phase(&self, index: usize) -> &Phase {
        &self.phases[index]
    }

    pub fn light_string(&self, index: usize) -> &LightString {
        &self.phases[index].lights
    }

    pub fn members(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.phases[index].member_indices()
    }

    /// Membership vectors of all phases, in phase order.
    pub fn membership_vectors(&self) -> Vec<Vec<bool>> {
        self.phases.iter().map(|p| p.members.clone()).collect()
    }

    /// Distinct incoming lane slots opened by a phase, in slot order.
    pub fn open_lane_slots(&self, index: usize) -> Vec<usize> {
        let mut slots: Vec<usize> = self
            .members(index)
            .map(|stream| self.lanes.incoming_slot(stream))
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Member pairs of a phase that are not compatible with each other.
    ///
    /// Rows of the matrix only guarantee compatibility with the reference
    /// stream, so this can be non-empty.
    pub fn conflicting_members(&self, index: usize) -> Vec<(usize, usize)> {
        let members: Vec<usize> = self.members(index).collect();
        let mut pairs = Vec::new();
        for (pos, &a) in members.iter().enumerate() {
            for &b in &members[pos + 1..] {
                if !self.compatibility.get(a, b) || !self.compatibility.get(b, a) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }
}
