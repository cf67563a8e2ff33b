//! Error types for section and assembly calculations.

use cc_core::CcError;
use cc_fluids::FluidError;
use cc_point::PerfError;
use cc_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompressorError {
    #[error(transparent)]
    Perf(#[from] PerfError),

    /// A correction is enabled but the measurement it needs is absent.
    #[error("Missing auxiliary data: {what}")]
    MissingAuxiliaryData { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type CompressorResult<T> = Result<T, CompressorError>;

impl From<FluidError> for CompressorError {
    fn from(e: FluidError) -> Self {
        CompressorError::Perf(e.into())
    }
}

impl From<SolverError> for CompressorError {
    fn from(e: SolverError) -> Self {
        CompressorError::Perf(e.into())
    }
}

impl From<CompressorError> for CcError {
    fn from(e: CompressorError) -> Self {
        match e {
            CompressorError::Perf(e) => e.into(),
            CompressorError::MissingAuxiliaryData { what } => CcError::InvalidArg { what },
            CompressorError::InvalidArg { what } => CcError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_names_the_measurement() {
        let err = CompressorError::MissingAuxiliaryData {
            what: "bearing oil flows",
        };
        assert!(err.to_string().contains("bearing oil flows"));
    }

    #[test]
    fn solver_failures_keep_their_details() {
        let err: CompressorError = SolverError::ConvergenceFailed {
            what: "speed".into(),
            iterations: 50,
            residual: 1e-3,
        }
        .into();
        assert!(matches!(
            err,
            CompressorError::Perf(PerfError::ConvergenceFailure { iterations: 50, .. })
        ));
    }
}
