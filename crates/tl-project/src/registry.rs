//! Building a running registry from a controller file.

use tl_core::JunctionId;
use tl_sim::{IntersectionRegistry, SimError};

use crate::schema::ControllerFile;
use crate::topology::StaticTopology;
use crate::{ProjectResult, validate::derive_tables};

impl ControllerFile {
    /// Topology provider over this file's junctions.
    pub fn topology(&self) -> StaticTopology {
        StaticTopology::new(self.junctions.clone())
    }

    pub fn junction_ids(&self) -> Vec<JunctionId> {
        self.junctions.iter().map(|j| j.junction_id()).collect()
    }

    /// Validate, then register every junction with the phase table derived
    /// during validation and the shared controller settings.
    pub fn build_registry(&self) -> ProjectResult<IntersectionRegistry> {
        let tables = derive_tables(self)?;

        let controller = &self.controller;
        let green_time = controller.green_time.build().map_err(SimError::from)?;
        let scheduler = controller.scheduler.build();

        let mut registry = IntersectionRegistry::new();
        registry.register_all(tables, &green_time, &scheduler, &controller.options)?;
        Ok(registry)
    }
}
