//! Controller file schema.
//!
//! Matrices are written as one bit string per row, `'1'` at column j meaning
//! the relation holds between the row's stream and stream j. An omitted
//! matrix means no pair is related.

use serde::{Deserialize, Serialize};
use tl_controls::{GreenTimePolicy, SchedulerPolicy};
use tl_graph::{Direction, ResolutionModel};
use tl_sim::MachineOptions;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub controller: ControllerDef,
    #[serde(default)]
    pub junctions: Vec<JunctionDef>,
}

/// Settings shared by every junction in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ControllerDef {
    #[serde(default)]
    pub options: MachineOptions,
    #[serde(default)]
    pub green_time: GreenTimePolicy,
    #[serde(default)]
    pub scheduler: SchedulerPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JunctionDef {
    pub id: String,
    #[serde(default)]
    pub resolution: ResolutionModel,
    pub streams: Vec<StreamDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<String>,
}

/// One stream; its index is its position in the list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamDef {
    pub incoming: String,
    pub outgoing: String,
    pub direction: Direction,
}
