//! Fluid property errors.

use cc_core::CcError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of valid range.
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Component name not in the species catalogue.
    #[error("Unknown species: {name}")]
    UnknownSpecies { name: String },

    /// Mole fractions that sum neither to ~1 nor to ~100.
    #[error("Mole fractions sum to {sum}, expected about 1 or about 100")]
    CompositionSum { sum: f64 },

    /// Operation not supported (e.g., species without backend data).
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Backend (CoolProp) error.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Convergence failure of an internal flash.
    #[error("Convergence failed for {what}")]
    ConvergenceFailed { what: &'static str },
}

impl FluidError {
    /// Whether the error comes from the composition itself rather than a property call.
    pub fn is_composition_error(&self) -> bool {
        matches!(
            self,
            FluidError::UnknownSpecies { .. } | FluidError::CompositionSum { .. }
        )
    }
}

impl From<FluidError> for CcError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => CcError::Invariant { what },
            FluidError::OutOfRange { what } | FluidError::InvalidArg { what } => {
                CcError::InvalidArg { what }
            }
            FluidError::UnknownSpecies { .. } | FluidError::CompositionSum { .. } => {
                CcError::InvalidArg {
                    what: "fluid composition",
                }
            }
            FluidError::NotSupported { what } => CcError::InvalidArg { what },
            FluidError::Backend { message } => CcError::Convergence { what: message },
            FluidError::ConvergenceFailed { what } => CcError::Convergence {
                what: what.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::NonPhysical { what: "pressure" };
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::UnknownSpecies {
            name: "unobtainium".into(),
        };
        assert!(err.to_string().contains("unobtainium"));
    }

    #[test]
    fn composition_errors_are_flagged() {
        assert!(FluidError::CompositionSum { sum: 0.5 }.is_composition_error());
        assert!(!FluidError::NonPhysical { what: "p" }.is_composition_error());
    }

    #[test]
    fn error_to_cc_error() {
        let fluid_err = FluidError::ConvergenceFailed { what: "ph flash" };
        let cc_err: CcError = fluid_err.into();
        assert!(matches!(cc_err, CcError::Convergence { .. }));
    }
}
