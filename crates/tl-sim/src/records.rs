//! Green-time history.

use serde::{Deserialize, Serialize};
use tl_core::LaneId;

/// One green-time decision: the duration assigned to the streams of the
/// phase that just ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenTimeRecord {
    /// Tick at which the decision was made.
    pub tick: u64,
    /// Phase whose streams received the new green time.
    pub phase: usize,
    /// Incoming lanes the phase had open.
    pub lanes: Vec<LaneId>,
    /// New green time (seconds).
    pub green_time: f64,
}

/// Append-only record of green-time decisions for one junction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreenTimeHistory {
    records: Vec<GreenTimeRecord>,
}

impl GreenTimeHistory {
    pub fn push(&mut self, record: GreenTimeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[GreenTimeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&GreenTimeRecord> {
        self.records.last()
    }

    /// `(tick, green_time)` series for one lane.
    pub fn lane_series<'a>(&'a self, lane: &'a LaneId) -> impl Iterator<Item = (u64, f64)> + 'a {
        self.records
            .iter()
            .filter(move |r| r.lanes.contains(lane))
            .map(|r| (r.tick, r.green_time))
    }
}
