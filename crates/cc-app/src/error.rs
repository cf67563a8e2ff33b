//! Error types for the cc-app service layer.

/// Application error shared by the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Invalid project value {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unsupported: {message}")]
    Unsupported { message: String },

    #[error("Table header: {reason}")]
    TableHeader { reason: String },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cc-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cc_project::ProjectError> for AppError {
    fn from(err: cc_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<cc_project::ValidationError> for AppError {
    fn from(err: cc_project::ValidationError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<cc_compressor::CompressorError> for AppError {
    fn from(err: cc_compressor::CompressorError) -> Self {
        AppError::Engine(err.to_string())
    }
}

impl From<cc_point::PerfError> for AppError {
    fn from(err: cc_point::PerfError) -> Self {
        AppError::Engine(err.to_string())
    }
}

impl From<cc_fluids::FluidError> for AppError {
    fn from(err: cc_fluids::FluidError) -> Self {
        AppError::Engine(err.to_string())
    }
}
