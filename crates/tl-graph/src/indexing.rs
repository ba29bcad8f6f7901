//! Lane indexing.
//!
//! Maps streams to the physical lanes they use. Streams that share an incoming
//! lane share a signal head; streams that share an outgoing lane compete for
//! the same downstream capacity. Lanes are numbered by first appearance in
//! stream order, giving contiguous slots 0..L for per-lane state vectors.

use std::collections::HashMap;

use tl_core::LaneId;

use crate::topology::Stream;

#[derive(Debug, Clone, Default)]
struct LaneGroups {
    lanes: Vec<LaneId>,
    members: Vec<Vec<usize>>,
    slot_of_stream: Vec<usize>,
}

impl LaneGroups {
    fn build<'a>(lanes_by_stream: impl Iterator<Item = &'a LaneId>) -> Self {
        let mut groups = LaneGroups::default();
        let mut lookup: HashMap<&LaneId, usize> = HashMap::new();
        for (stream, lane) in lanes_by_stream.enumerate() {
            let slot = *lookup.entry(lane).or_insert_with(|| {
                groups.lanes.push(lane.clone());
                groups.members.push(Vec::new());
                groups.lanes.len() - 1
            });
            groups.members[slot].push(stream);
            groups.slot_of_stream.push(slot);
        }
        groups
    }
}

/// Bidirectional stream/lane mapping for one junction.
#[derive(Debug, Clone)]
pub struct LaneIndex {
    incoming: LaneGroups,
    outgoing: LaneGroups,
}

impl LaneIndex {
    pub fn from_streams(streams: &[Stream]) -> Self {
        Self {
            incoming: LaneGroups::build(streams.iter().map(|s| &s.incoming_lane)),
            outgoing: LaneGroups::build(streams.iter().map(|s| &s.outgoing_lane)),
        }
    }

    /// Number of distinct incoming lanes (signal heads).
    pub fn incoming_count(&self) -> usize {
        self.incoming.lanes.len()
    }

    /// Number of distinct outgoing lanes.
    pub fn outgoing_count(&self) -> usize {
        self.outgoing.lanes.len()
    }

    pub fn incoming_lanes(&self) -> &[LaneId] {
        &self.incoming.lanes
    }

    pub fn outgoing_lanes(&self) -> &[LaneId] {
        &self.outgoing.lanes
    }

    /// Lane at an incoming slot (panics if out of bounds).
    pub fn incoming_lane(&self, slot: usize) -> &LaneId {
        &self.incoming.lanes[slot]
    }

    /// Lane at an outgoing slot (panics if out of bounds).
    pub fn outgoing_lane(&self, slot: usize) -> &LaneId {
        &self.outgoing.lanes[slot]
    }

    /// Streams controlled by the signal head of an incoming slot.
    pub fn streams_on_incoming(&self, slot: usize) -> &[usize] {
        &self.incoming.members[slot]
    }

    /// Streams feeding an outgoing slot.
    pub fn streams_into_outgoing(&self, slot: usize) -> &[usize] {
        &self.outgoing.members[slot]
    }

    pub fn incoming_slot(&self, stream: usize) -> usize {
        self.incoming.slot_of_stream[stream]
    }

    pub fn outgoing_slot(&self, stream: usize) -> usize {
        self.outgoing.slot_of_stream[stream]
    }

    /// Outgoing slot per stream, in stream order.
    pub fn outgoing_slots(&self) -> &[usize] {
        &self.outgoing.slot_of_stream
    }

    /// Incoming lane groups as index sets.
    pub fn incoming_groups(&self) -> &[Vec<usize>] {
        &self.incoming.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TopologyBuilder;
    use crate::topology::Direction;

    #[test]
    fn shared_lanes_group_streams() {
        let mut builder = TopologyBuilder::new();
        builder.add_stream("n_0", "e_out", Direction::Left);
        builder.add_stream("n_0", "s_out", Direction::Through);
        builder.add_stream("w_0", "e_out", Direction::Through);
        let topology = builder.build().unwrap();

        let index = LaneIndex::from_streams(topology.streams());
        assert_eq!(index.incoming_count(), 2);
        assert_eq!(index.outgoing_count(), 2);
        assert_eq!(index.streams_on_incoming(0), &[0, 1]);
        assert_eq!(index.streams_into_outgoing(0), &[0, 2]);
        assert_eq!(index.incoming_slot(2), 1);
        assert_eq!(index.outgoing_slots(), &[0, 1, 0]);
        assert_eq!(index.incoming_lane(1).as_str(), "w_0");
    }

    #[test]
    fn non_contiguous_lane_members() {
        let mut builder = TopologyBuilder::new();
        builder.add_stream("a", "x", Direction::Through);
        builder.add_stream("b", "y", Direction::Through);
        builder.add_stream("a", "z", Direction::Right);
        let topology = builder.build().unwrap();

        let index = LaneIndex::from_streams(topology.streams());
        assert_eq!(index.streams_on_incoming(0), &[0, 2]);
        assert_eq!(index.streams_on_incoming(1), &[1]);
    }
}
