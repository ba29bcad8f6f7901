//! Scripted simulator shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tl_core::{JunctionId, LaneId, VehicleId};
use tl_graph::LightString;
use tl_sim::{CollaboratorError, SignalIo};

/// How queue lengths are reported.
pub enum QueueScript {
    /// Fixed count per lane (missing lanes report zero).
    Fixed(HashMap<LaneId, u32>),
    /// `waiting` vehicles on every lane whose stream (`in_<k>` serves
    /// stream k) was last shown red, none on the others.
    WaitingWhileRed { waiting: u32 },
    /// Number of vehicles currently placed on the lane.
    VehicleCount,
}

pub struct ScriptedIo {
    pub queues: QueueScript,
    pub capacity: i64,
    pub vehicles: Mutex<HashMap<LaneId, HashSet<VehicleId>>>,
    pub actuations: Mutex<Vec<(JunctionId, String)>>,
    pub fail_actuation: AtomicBool,
    pub fail_sensors: AtomicBool,
}

impl ScriptedIo {
    pub fn new(queues: QueueScript) -> Self {
        Self {
            queues,
            capacity: 100,
            vehicles: Mutex::new(HashMap::new()),
            actuations: Mutex::new(Vec::new()),
            fail_actuation: AtomicBool::new(false),
            fail_sensors: AtomicBool::new(false),
        }
    }

    pub fn place(&self, lane: &str, ids: &[&str]) {
        self.vehicles.lock().unwrap().insert(
            LaneId::new(lane),
            ids.iter().map(|&id| VehicleId::new(id)).collect(),
        );
    }

    /// Light strings actuated at one junction, oldest first.
    pub fn shown(&self, junction: &str) -> Vec<String> {
        self.actuations
            .lock()
            .unwrap()
            .iter()
            .filter(|(j, _)| j.as_str() == junction)
            .map(|(_, lights)| lights.clone())
            .collect()
    }

    fn last_shown(&self) -> Option<String> {
        self.actuations
            .lock()
            .unwrap()
            .last()
            .map(|(_, lights)| lights.clone())
    }

    fn check_sensors(&self, operation: &'static str, lane: &LaneId) -> Result<(), CollaboratorError> {
        if self.fail_sensors.load(Ordering::SeqCst) {
            Err(CollaboratorError::new(operation, lane, "sensor offline"))
        } else {
            Ok(())
        }
    }
}

impl SignalIo for ScriptedIo {
    fn queue_length(&self, lane: &LaneId) -> Result<u32, CollaboratorError> {
        self.check_sensors("queue_length", lane)?;
        Ok(match &self.queues {
            QueueScript::Fixed(counts) => counts.get(lane).copied().unwrap_or(0),
            QueueScript::WaitingWhileRed { waiting } => {
                let stream: usize = lane
                    .as_str()
                    .trim_start_matches("in_")
                    .parse()
                    .map_err(|_| CollaboratorError::new("queue_length", lane, "unknown lane"))?;
                match self.last_shown() {
                    Some(lights) if lights.chars().nth(stream) != Some('r') => 0,
                    _ => *waiting,
                }
            }
            QueueScript::VehicleCount => self
                .vehicles
                .lock()
                .unwrap()
                .get(lane)
                .map_or(0, |ids| ids.len() as u32),
        })
    }

    fn vehicle_ids(&self, lane: &LaneId) -> Result<HashSet<VehicleId>, CollaboratorError> {
        self.check_sensors("vehicle_ids", lane)?;
        Ok(self
            .vehicles
            .lock()
            .unwrap()
            .get(lane)
            .cloned()
            .unwrap_or_default())
    }

    fn downstream_capacity(&self, lane: &LaneId) -> Result<i64, CollaboratorError> {
        self.check_sensors("downstream_capacity", lane)?;
        Ok(self.capacity)
    }

    fn set_signal_state(
        &self,
        junction: &JunctionId,
        lights: &LightString,
    ) -> Result<(), CollaboratorError> {
        if self.fail_actuation.load(Ordering::SeqCst) {
            return Err(CollaboratorError::new(
                "set_signal_state",
                junction,
                "actuator unreachable",
            ));
        }
        self.actuations
            .lock()
            .unwrap()
            .push((junction.clone(), lights.to_string()));
        Ok(())
    }
}
