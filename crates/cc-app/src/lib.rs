//! Shared application service layer for the compressor performance tools.
//!
//! Turns project documents into assemblies, evaluates them, matches the
//! operating speed and evaluates tables of test points. The CLI is a thin
//! shell over this crate.

pub mod build;
pub mod error;
pub mod project_service;
pub mod table;

pub use build::{Assembly, Engine, build_assembly, build_fluid_model, build_point};
pub use error::{AppError, AppResult};
pub use project_service::{
    Evaluation, PointSummary, SectionSummary, TestSummary, evaluate_project, load_project,
    match_speed, match_speed_and_save, save_project, validate_project,
};
pub use table::{FlaggedRow, TableReport, TableRow, TableSection, evaluate_table};
