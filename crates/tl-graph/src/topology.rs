//! Raw right-of-way topology of one junction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tl_core::LaneId;

use crate::error::GraphError;
use crate::validate;

/// Turning movement of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "s")]
    Through,
    #[serde(alias = "l")]
    Left,
    #[serde(alias = "r")]
    Right,
}

impl FromStr for Direction {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "through" => Ok(Direction::Through),
            "l" | "left" => Ok(Direction::Left),
            "r" | "right" => Ok(Direction::Right),
            other => Err(GraphError::UnknownDirection {
                code: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Through => "through",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// One inbound-lane × turning-direction movement (a queue).
///
/// Streams are created once from topology and never change during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub index: usize,
    pub incoming_lane: LaneId,
    pub outgoing_lane: LaneId,
    pub direction: Direction,
}

/// Validated topology: streams plus the foe and priority relations.
///
/// `foes[i][j]`: i and j physically conflict.
/// `priority[i][j]`: i has right-of-way over j when unsignalled.
#[derive(Debug, Clone)]
pub struct JunctionTopology {
    pub(crate) streams: Vec<Stream>,
    pub(crate) foes: Vec<Vec<bool>>,
    pub(crate) priority: Vec<Vec<bool>>,
}

impl JunctionTopology {
    /// Validate and wrap raw topology data.
    pub fn new(
        streams: Vec<Stream>,
        foes: Vec<Vec<bool>>,
        priority: Vec<Vec<bool>>,
    ) -> Result<Self, GraphError> {
        validate::validate_topology(&streams, &foes, &priority)?;
        Ok(Self {
            streams,
            foes,
            priority,
        })
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn stream(&self, index: usize) -> Option<&Stream> {
        self.streams.get(index)
    }

    pub fn are_foes(&self, i: usize, j: usize) -> bool {
        self.foes[i][j]
    }

    pub fn has_priority(&self, i: usize, j: usize) -> bool {
        self.priority[i][j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_accepts_codes_and_words() {
        assert_eq!("s".parse::<Direction>().unwrap(), Direction::Through);
        assert_eq!("left".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("r".parse::<Direction>().unwrap(), Direction::Right);
        assert!("t".parse::<Direction>().is_err());
    }

    #[test]
    fn direction_round_trips_through_display() {
        for dir in [Direction::Through, Direction::Left, Direction::Right] {
            assert_eq!(dir.to_string().parse::<Direction>().unwrap(), dir);
        }
    }
}
