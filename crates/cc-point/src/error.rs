//! Error types for operating-point calculations.

use cc_core::CcError;
use cc_fluids::FluidError;
use cc_solver::SolverError;
use thiserror::Error;

/// Errors raised while building, converting or fitting operating points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerfError {
    /// The supplied inputs match none of the closed point input variants.
    #[error("Invalid input combination: {what}")]
    InvalidInputCombination { what: String },

    /// Unknown species or fractions that do not normalise.
    #[error("Fluid composition error: {0}")]
    FluidComposition(FluidError),

    #[error("Convergence failure in {what}: {iterations} iterations, last residual {residual:e}")]
    ConvergenceFailure {
        what: String,
        iterations: usize,
        residual: f64,
    },

    #[error("Non-physical result: {what}")]
    NonPhysical { what: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Fluid error: {0}")]
    Fluid(FluidError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type PerfResult<T> = Result<T, PerfError>;

impl From<FluidError> for PerfError {
    fn from(e: FluidError) -> Self {
        if e.is_composition_error() {
            PerfError::FluidComposition(e)
        } else {
            PerfError::Fluid(e)
        }
    }
}

impl From<SolverError> for PerfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ConvergenceFailed {
                what,
                iterations,
                residual,
            } => PerfError::ConvergenceFailure {
                what,
                iterations,
                residual,
            },
            SolverError::Numeric { what } => PerfError::Numeric { what },
            SolverError::InvalidArg { what } => PerfError::InvalidArg { what },
        }
    }
}

impl From<PerfError> for CcError {
    fn from(e: PerfError) -> Self {
        match e {
            PerfError::ConvergenceFailure { what, .. } => CcError::Convergence { what },
            PerfError::InvalidInputCombination { .. } => CcError::InvalidArg {
                what: "point input combination",
            },
            PerfError::FluidComposition(_) => CcError::InvalidArg {
                what: "fluid composition",
            },
            PerfError::NonPhysical { .. } => CcError::Invariant {
                what: "non-physical point",
            },
            PerfError::InvalidArg { what } => CcError::InvalidArg { what },
            PerfError::Fluid(e) => e.into(),
            PerfError::Numeric { .. } => CcError::Invariant { what: "numeric" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_errors_are_classified() {
        let e: PerfError = FluidError::UnknownSpecies {
            name: "xenonite".into(),
        }
        .into();
        assert!(matches!(e, PerfError::FluidComposition(_)));

        let e: PerfError = FluidError::NonPhysical { what: "density" }.into();
        assert!(matches!(e, PerfError::Fluid(_)));
    }

    #[test]
    fn solver_budget_becomes_convergence_failure() {
        let e: PerfError = SolverError::ConvergenceFailed {
            what: "speed".into(),
            iterations: 50,
            residual: 1e-3,
        }
        .into();
        assert_eq!(
            e,
            PerfError::ConvergenceFailure {
                what: "speed".into(),
                iterations: 50,
                residual: 1e-3
            }
        );
    }
}
