//! Fluid property model trait and validation helpers.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput, ThermoState};
use cc_core::units::{Density, DynVisc, Pressure, Temperature, Velocity};

/// Every property a backend computes for one state, on a mass basis.
///
/// Backends fill the whole pack in one pass so that a `ThermoState` never has
/// to go back to the backend for a property.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermoPropertyPack {
    /// Pressure [Pa]
    pub p: Pressure,

    /// Temperature [K]
    pub t: Temperature,

    /// Density [kg/m³]
    pub rho: Density,

    /// Specific enthalpy [J/kg]
    pub h: SpecEnthalpy,

    /// Specific entropy [J/(kg·K)]
    pub s: SpecEntropy,

    /// Specific heat capacity at constant pressure [J/(kg·K)]
    pub cp: SpecHeatCapacity,

    /// Specific heat capacity at constant volume [J/(kg·K)]
    pub cv: SpecHeatCapacity,

    /// Speed of sound [m/s]
    pub a: Velocity,

    /// Dynamic viscosity [Pa·s]
    pub mu: DynVisc,

    /// Compressibility factor Z = p M / (rho R T)
    pub z: f64,

    /// Molar mass [kg/kmol]
    pub molar_mass: f64,
}

impl ThermoPropertyPack {
    /// Return a summary string of all contained properties (for debugging).
    pub fn summary(&self) -> String {
        format!(
            "Pack(P={:.0}Pa,T={:.2}K,ρ={:.4}kg/m³,h={:.1}J/kg,s={:.2}J/kg·K,cp={:.1},cv={:.1},a={:.1}m/s,Z={:.4})",
            self.p.value,
            self.t.value,
            self.rho.value,
            self.h,
            self.s,
            self.cp,
            self.cv,
            self.a.value,
            self.z
        )
    }

    pub(crate) fn validate(&self) -> FluidResult<()> {
        validation::validate_pressure(self.p)?;
        validation::validate_temperature(self.t)?;
        validation::validate_density(self.rho)?;
        validation::validate_enthalpy(self.h)?;
        validation::validate_entropy(self.s)?;
        validation::validate_cp(self.cp)?;
        validation::validate_cp(self.cv)?;
        validation::validate_speed_of_sound(self.a)?;
        Ok(())
    }
}

/// Trait for fluid property models.
///
/// Implementations must be thread-safe (Send + Sync) to support parallel evaluation.
/// A call is a pure function of (composition, property pair).
pub trait FluidModel: Send + Sync {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Check if this model supports the given composition.
    fn supports_composition(&self, comp: &Composition) -> bool;

    /// Create a thermodynamic state from an input pair.
    fn state(&self, input: StateInput, comp: Composition) -> FluidResult<ThermoState>;
}

/// Validation helpers for fluid properties.
pub(crate) mod validation {
    use super::*;

    /// Ensure pressure is positive and finite.
    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure temperature is positive and finite.
    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure density is positive and finite.
    pub fn validate_density(rho: Density) -> FluidResult<()> {
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure specific heat capacity is positive and finite.
    pub fn validate_cp(cp: f64) -> FluidResult<()> {
        if !cp.is_finite() || cp <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "cp must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure speed of sound is positive and finite.
    pub fn validate_speed_of_sound(a: Velocity) -> FluidResult<()> {
        if !a.value.is_finite() || a.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "speed of sound must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure enthalpy is finite (can be negative).
    pub fn validate_enthalpy(h: f64) -> FluidResult<()> {
        if !h.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy must be finite",
            });
        }
        Ok(())
    }

    /// Ensure entropy is finite (can be negative).
    pub fn validate_entropy(s: f64) -> FluidResult<()> {
        if !s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "entropy must be finite",
            });
        }
        Ok(())
    }
}
