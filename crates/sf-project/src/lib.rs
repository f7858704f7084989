//! sf-project: system definition files, validation and building.

pub mod build;
pub mod migrate;
pub mod schema;
pub mod validate;

pub use build::{BuiltSystem, build_system};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_system};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Build error: {0}")]
    Flow(#[from] sf_flow::FlowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse, migrate and validate a YAML definition.
pub fn parse_yaml(content: &str) -> ProjectResult<SystemDef> {
    let def: SystemDef = serde_yaml::from_str(content)?;
    finish_load(def)
}

/// Parse, migrate and validate a JSON definition.
pub fn parse_json(content: &str) -> ProjectResult<SystemDef> {
    let def: SystemDef = serde_json::from_str(content)?;
    finish_load(def)
}

fn finish_load(def: SystemDef) -> ProjectResult<SystemDef> {
    let def = migrate_to_latest(def)?;
    validate_system(&def)?;
    Ok(def)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<SystemDef> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn save_yaml(path: &std::path::Path, def: &SystemDef) -> ProjectResult<()> {
    validate_system(def)?;
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<SystemDef> {
    let content = std::fs::read_to_string(path)?;
    parse_json(&content)
}

pub fn save_json(path: &std::path::Path, def: &SystemDef) -> ProjectResult<()> {
    validate_system(def)?;
    let content = serde_json::to_string_pretty(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a definition, choosing the format from the file extension.
///
/// `.json` is read as JSON, anything else as YAML.
pub fn load(path: &std::path::Path) -> ProjectResult<SystemDef> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}
