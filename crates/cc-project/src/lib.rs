//! cc-project: project document format, migration and validation.
//!
//! A project holds everything needed to rebuild an assembly: fluid, method,
//! correction switches, impeller geometry, guarantee point(s), raw test
//! points and the operating speed once it has been matched. Values are
//! unit-tagged text; see [`validate::parse_field`].

pub mod migrate;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, parse_field, validate_project};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Unsupported file extension: {path}")]
    Extension { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn finish_load(project: Project) -> ProjectResult<Project> {
    let from = project.version;
    let project = migrate_to_latest(project)?;
    if from != project.version {
        tracing::info!(from, to = project.version, "project migrated");
    }
    validate_project(&project)?;
    Ok(project)
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    finish_load(serde_yaml::from_str(&content)?)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    finish_load(serde_json::from_str(&content)?)
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn is_json(path: &Path) -> ProjectResult<bool> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(true),
        Some("yaml" | "yml") => Ok(false),
        _ => Err(ProjectError::Extension {
            path: path.display().to_string(),
        }),
    }
}

/// Load YAML or JSON by file extension.
pub fn load(path: &Path) -> ProjectResult<Project> {
    if is_json(path)? {
        load_json(path)
    } else {
        load_yaml(path)
    }
}

/// Save YAML or JSON by file extension.
pub fn save(path: &Path, project: &Project) -> ProjectResult<()> {
    if is_json(path)? {
        save_json(path, project)
    } else {
        save_yaml(path, project)
    }
}
