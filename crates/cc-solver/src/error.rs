//! Error types for solver operations.

use cc_core::CcError;
use thiserror::Error;

/// Errors raised by the root finders and the curve fitter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The iteration budget ran out before the step tolerance was met.
    #[error("Convergence failed: {what} after {iterations} iterations (residual {residual:e})")]
    ConvergenceFailed {
        what: String,
        iterations: usize,
        residual: f64,
    },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for CcError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ConvergenceFailed { what, .. } => CcError::Convergence { what },
            SolverError::Numeric { .. } => CcError::Invariant { what: "numeric" },
            SolverError::InvalidArg { what } => CcError::InvalidArg { what },
        }
    }
}
