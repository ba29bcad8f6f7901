//! Turning junction definitions into graph topology.

use tl_core::{JunctionId, LaneId};
use tl_graph::{ConflictGraphBuilder, JunctionTopology, PhaseTable, Stream};
use tl_sim::{CollaboratorError, TopologyProvider};

use crate::schema::JunctionDef;
use crate::validate::ValidationError;

impl JunctionDef {
    pub fn junction_id(&self) -> JunctionId {
        JunctionId::new(self.id.as_str())
    }

    pub fn to_streams(&self) -> Vec<Stream> {
        self.streams
            .iter()
            .enumerate()
            .map(|(index, s)| Stream {
                index,
                incoming_lane: LaneId::new(s.incoming.as_str()),
                outgoing_lane: LaneId::new(s.outgoing.as_str()),
                direction: s.direction,
            })
            .collect()
    }

    pub fn foe_matrix(&self) -> Result<Vec<Vec<bool>>, ValidationError> {
        parse_matrix(&self.id, "foes", &self.foes, self.streams.len())
    }

    pub fn priority_matrix(&self) -> Result<Vec<Vec<bool>>, ValidationError> {
        parse_matrix(&self.id, "priority", &self.priority, self.streams.len())
    }

    pub fn to_topology(&self) -> Result<JunctionTopology, ValidationError> {
        JunctionTopology::new(self.to_streams(), self.foe_matrix()?, self.priority_matrix()?)
            .map_err(|e| ValidationError::Topology {
                junction: self.id.clone(),
                reason: e.to_string(),
            })
    }

    /// Derive the phase table with this junction's resolution model.
    pub fn derive_phases(&self) -> Result<PhaseTable, ValidationError> {
        ConflictGraphBuilder::new(self.resolution)
            .derive(&self.to_topology()?)
            .map_err(|e| ValidationError::Topology {
                junction: self.id.clone(),
                reason: e.to_string(),
            })
    }
}

/// Parse bit-string rows into an n×n matrix; no rows means all false.
pub fn parse_matrix(
    junction: &str,
    what: &str,
    rows: &[String],
    n: usize,
) -> Result<Vec<Vec<bool>>, ValidationError> {
    if rows.is_empty() {
        return Ok(vec![vec![false; n]; n]);
    }
    let field = format!("junctions.{junction}.{what}");
    if rows.len() != n {
        return Err(ValidationError::InvalidValue {
            field,
            value: rows.len().to_string(),
            reason: format!("expected {n} rows"),
        });
    }
    rows.iter()
        .map(|row| {
            if row.chars().count() != n {
                return Err(ValidationError::InvalidValue {
                    field: field.clone(),
                    value: row.clone(),
                    reason: format!("expected {n} columns"),
                });
            }
            row.chars()
                .map(|c| match c {
                    '0' => Ok(false),
                    '1' => Ok(true),
                    _ => Err(ValidationError::InvalidValue {
                        field: field.clone(),
                        value: row.clone(),
                        reason: "rows may only contain '0' and '1'".to_string(),
                    }),
                })
                .collect()
        })
        .collect()
}

/// Topology provider backed by the junctions written in a controller file.
#[derive(Debug, Clone)]
pub struct StaticTopology {
    junctions: Vec<JunctionDef>,
}

impl StaticTopology {
    pub fn new(junctions: Vec<JunctionDef>) -> Self {
        Self { junctions }
    }

    pub fn ids(&self) -> Vec<JunctionId> {
        self.junctions.iter().map(JunctionDef::junction_id).collect()
    }

    fn find(&self, operation: &'static str, junction: &JunctionId) -> Result<&JunctionDef, CollaboratorError> {
        self.junctions
            .iter()
            .find(|j| j.id == junction.as_str())
            .ok_or_else(|| CollaboratorError::new(operation, junction, "junction not in file"))
    }
}

fn invalid(operation: &'static str, junction: &JunctionId, err: ValidationError) -> CollaboratorError {
    CollaboratorError::new(operation, junction, err.to_string())
}

impl TopologyProvider for StaticTopology {
    fn get_streams(&self, junction: &JunctionId) -> Result<Vec<Stream>, CollaboratorError> {
        Ok(self.find("get_streams", junction)?.to_streams())
    }

    fn get_foe_matrix(&self, junction: &JunctionId) -> Result<Vec<Vec<bool>>, CollaboratorError> {
        self.find("get_foe_matrix", junction)?
            .foe_matrix()
            .map_err(|e| invalid("get_foe_matrix", junction, e))
    }

    fn get_priority_matrix(
        &self,
        junction: &JunctionId,
    ) -> Result<Vec<Vec<bool>>, CollaboratorError> {
        self.find("get_priority_matrix", junction)?
            .priority_matrix()
            .map_err(|e| invalid("get_priority_matrix", junction, e))
    }
}
