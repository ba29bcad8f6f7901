//! Controller file validation.

use std::collections::HashSet;

use tl_core::JunctionId;
use tl_graph::PhaseTable;

use crate::schema::{ControllerFile, JunctionDef};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Junction {junction}: {reason}")]
    Topology { junction: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_file(file: &ControllerFile) -> Result<(), ValidationError> {
    derive_tables(file).map(|_| ())
}

/// Validate the file and return every junction's phase table, in file order.
pub fn derive_tables(
    file: &ControllerFile,
) -> Result<Vec<(JunctionId, PhaseTable)>, ValidationError> {
    if file.version == 0 || file.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let controller = &file.controller;
    controller
        .options
        .validate()
        .map_err(|e| ValidationError::InvalidValue {
            field: "controller.options".to_string(),
            value: format!("{:?}", controller.options),
            reason: e.to_string(),
        })?;
    controller
        .green_time
        .build()
        .map_err(|e| ValidationError::InvalidValue {
            field: "controller.green_time".to_string(),
            value: format!("{:?}", controller.green_time),
            reason: e.to_string(),
        })?;

    let mut ids = HashSet::new();
    let mut tables = Vec::with_capacity(file.junctions.len());
    for junction in &file.junctions {
        if !ids.insert(junction.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: junction.id.clone(),
                context: "junctions".to_string(),
            });
        }
        tables.push((junction.junction_id(), validate_junction(junction)?));
    }

    Ok(tables)
}

fn validate_junction(junction: &JunctionDef) -> Result<PhaseTable, ValidationError> {
    if junction.id.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "junctions.id".to_string(),
            value: String::new(),
            reason: "junction id must not be empty".to_string(),
        });
    }
    if junction.streams.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("junctions.{}.streams", junction.id),
            value: "[]".to_string(),
            reason: "a junction needs at least one stream".to_string(),
        });
    }
    for (index, stream) in junction.streams.iter().enumerate() {
        if stream.incoming.is_empty() || stream.outgoing.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("junctions.{}.streams[{index}]", junction.id),
                value: format!("{} -> {}", stream.incoming, stream.outgoing),
                reason: "lane ids must not be empty".to_string(),
            });
        }
    }

    // Missing right-of-way and lane self-conflicts only show up on derivation
    junction.derive_phases()
}
