//! tl-project: controller file format, validation and registry assembly.

pub mod registry;
pub mod schema;
pub mod topology;
pub mod validate;

use std::path::Path;

pub use schema::*;
pub use topology::{StaticTopology, parse_matrix};
pub use validate::{LATEST_VERSION, ValidationError, derive_tables, validate_file};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Controller error: {0}")]
    Sim(#[from] tl_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<ControllerFile> {
    let content = std::fs::read_to_string(path)?;
    let file: ControllerFile = serde_yaml::from_str(&content)?;
    validate_file(&file)?;
    Ok(file)
}

pub fn save_yaml(path: &Path, file: &ControllerFile) -> ProjectResult<()> {
    validate_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<ControllerFile> {
    let content = std::fs::read_to_string(path)?;
    let file: ControllerFile = serde_json::from_str(&content)?;
    validate_file(&file)?;
    Ok(file)
}

pub fn save_json(path: &Path, file: &ControllerFile) -> ProjectResult<()> {
    validate_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &Path) -> ProjectResult<ControllerFile> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
