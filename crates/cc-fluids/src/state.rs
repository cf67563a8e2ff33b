//! Thermodynamic state definitions.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, ThermoPropertyPack};
use cc_core::numeric::{Tolerances, nearly_equal};
use cc_core::units::{Density, DynVisc, Pressure, Temperature, Velocity};

/// Specific enthalpy [J/kg].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEntropy = f64;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// Independent property pair defining a thermodynamic state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateInput {
    /// Pressure and temperature.
    PT { p: Pressure, t: Temperature },
    /// Pressure and specific enthalpy.
    PH { p: Pressure, h: SpecEnthalpy },
    /// Pressure and specific entropy.
    PS { p: Pressure, s: SpecEntropy },
    /// Specific enthalpy and specific entropy.
    HS { h: SpecEnthalpy, s: SpecEntropy },
    /// Density and pressure.
    DP { rho: Density, p: Pressure },
    /// Density and temperature.
    DT { rho: Density, t: Temperature },
    /// Density and specific entropy.
    DS { rho: Density, s: SpecEntropy },
    /// Density and specific enthalpy.
    DH { rho: Density, h: SpecEnthalpy },
}

impl StateInput {
    /// Short name of the pair, as used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            StateInput::PT { .. } => "PT",
            StateInput::PH { .. } => "PH",
            StateInput::PS { .. } => "PS",
            StateInput::HS { .. } => "HS",
            StateInput::DP { .. } => "DP",
            StateInput::DT { .. } => "DT",
            StateInput::DS { .. } => "DS",
            StateInput::DH { .. } => "DH",
        }
    }

    fn values(&self) -> (f64, f64) {
        match *self {
            StateInput::PT { p, t } => (p.value, t.value),
            StateInput::PH { p, h } => (p.value, h),
            StateInput::PS { p, s } => (p.value, s),
            StateInput::HS { h, s } => (h, s),
            StateInput::DP { rho, p } => (rho.value, p.value),
            StateInput::DT { rho, t } => (rho.value, t.value),
            StateInput::DS { rho, s } => (rho.value, s),
            StateInput::DH { rho, h } => (rho.value, h),
        }
    }
}

/// Immutable thermodynamic state.
///
/// Holds the composition, the pair it was defined from and every property the
/// backend derived for it. Two states compare equal when their compositions
/// match and their defining pairs agree within a relative tolerance of 1e-9.
#[derive(Debug, Clone)]
pub struct ThermoState {
    comp: Composition,
    input: StateInput,
    props: ThermoPropertyPack,
}

impl ThermoState {
    /// Assemble a state from a backend property pack.
    ///
    /// Validates that pressure, temperature and density are positive and finite.
    pub fn from_parts(
        input: StateInput,
        comp: Composition,
        props: ThermoPropertyPack,
    ) -> FluidResult<Self> {
        props.validate()?;
        Ok(Self { comp, input, props })
    }

    /// Define a new state of the same fluid from another property pair.
    pub fn update(&self, model: &dyn FluidModel, input: StateInput) -> FluidResult<ThermoState> {
        model.state(input, self.comp.clone())
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }

    pub fn input(&self) -> StateInput {
        self.input
    }

    pub fn props(&self) -> &ThermoPropertyPack {
        &self.props
    }

    pub fn p(&self) -> Pressure {
        self.props.p
    }

    pub fn t(&self) -> Temperature {
        self.props.t
    }

    pub fn rho(&self) -> Density {
        self.props.rho
    }

    /// Specific volume [m³/kg].
    pub fn v(&self) -> f64 {
        1.0 / self.props.rho.value
    }

    pub fn h(&self) -> SpecEnthalpy {
        self.props.h
    }

    pub fn s(&self) -> SpecEntropy {
        self.props.s
    }

    pub fn cp(&self) -> SpecHeatCapacity {
        self.props.cp
    }

    pub fn cv(&self) -> SpecHeatCapacity {
        self.props.cv
    }

    pub fn speed_of_sound(&self) -> Velocity {
        self.props.a
    }

    pub fn viscosity(&self) -> DynVisc {
        self.props.mu
    }

    /// Kinematic viscosity [m²/s].
    pub fn kinematic_viscosity(&self) -> f64 {
        self.props.mu.value / self.props.rho.value
    }

    pub fn compressibility_factor(&self) -> f64 {
        self.props.z
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.props.molar_mass
    }

    /// Heat capacity ratio cp/cv.
    pub fn gamma(&self) -> f64 {
        self.props.cp / self.props.cv
    }

    /// Isentropic volume exponent k = rho a² / p.
    pub fn isentropic_exponent(&self) -> f64 {
        let a = self.props.a.value;
        self.props.rho.value * a * a / self.props.p.value
    }
}

impl PartialEq for ThermoState {
    fn eq(&self, other: &Self) -> bool {
        if self.comp != other.comp {
            return false;
        }
        let tol = Tolerances {
            abs: 0.0,
            rel: 1e-9,
        };
        let same_kind =
            std::mem::discriminant(&self.input) == std::mem::discriminant(&other.input);
        let (a1, b1, a2, b2) = if same_kind {
            let (a1, b1) = self.input.values();
            let (a2, b2) = other.input.values();
            (a1, b1, a2, b2)
        } else {
            (
                self.props.p.value,
                self.props.t.value,
                other.props.p.value,
                other.props.t.value,
            )
        };
        nearly_equal(a1, a2, tol) && nearly_equal(b1, b2, tol)
    }
}

pub(crate) fn require_positive(v: f64, what: &'static str) -> FluidResult<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(FluidError::NonPhysical { what })
    }
}

pub(crate) fn require_finite(v: f64, what: &'static str) -> FluidResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FluidError::NonPhysical { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use cc_core::units::{k, kgpm3, mps, pa, pa_s};

    fn pack(p: f64, t: f64, rho: f64) -> ThermoPropertyPack {
        ThermoPropertyPack {
            p: pa(p),
            t: k(t),
            rho: kgpm3(rho),
            h: 0.0,
            s: 0.0,
            cp: 1040.0,
            cv: 743.0,
            a: mps(353.0),
            mu: pa_s(1.8e-5),
            z: 1.0,
            molar_mass: 28.0134,
        }
    }

    #[test]
    fn create_valid_state() {
        let comp = Composition::pure(Species::N2);
        let input = StateInput::PT {
            p: pa(101325.0),
            t: k(300.0),
        };
        let state = ThermoState::from_parts(input, comp, pack(101325.0, 300.0, 1.138)).unwrap();
        assert_eq!(state.p().value, 101325.0);
        assert_eq!(state.t().value, 300.0);
        assert!((state.gamma() - 1040.0 / 743.0).abs() < 1e-12);
    }

    #[test]
    fn reject_negative_pressure() {
        let comp = Composition::pure(Species::N2);
        let input = StateInput::PT {
            p: pa(-100.0),
            t: k(300.0),
        };
        assert!(ThermoState::from_parts(input, comp, pack(-100.0, 300.0, 1.0)).is_err());
    }

    #[test]
    fn reject_non_finite() {
        let comp = Composition::pure(Species::N2);
        let input = StateInput::PT {
            p: pa(f64::NAN),
            t: k(300.0),
        };
        assert!(ThermoState::from_parts(input, comp, pack(f64::NAN, 300.0, 1.0)).is_err());
    }

    #[test]
    fn equality_uses_defining_pair() {
        let comp = Composition::pure(Species::N2);
        let a = ThermoState::from_parts(
            StateInput::PT {
                p: pa(1e5),
                t: k(300.0),
            },
            comp.clone(),
            pack(1e5, 300.0, 1.12),
        )
        .unwrap();
        let b = ThermoState::from_parts(
            StateInput::PT {
                p: pa(1e5 * (1.0 + 1e-12)),
                t: k(300.0),
            },
            comp.clone(),
            pack(1e5, 300.0, 1.12),
        )
        .unwrap();
        let c = ThermoState::from_parts(
            StateInput::PT {
                p: pa(1.01e5),
                t: k(300.0),
            },
            comp,
            pack(1.01e5, 300.0, 1.13),
        )
        .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn isentropic_exponent_of_ideal_gas_is_gamma() {
        // a² = gamma p / rho for an ideal gas
        let gamma: f64 = 1.4;
        let (p, rho) = (1e5, 1.16);
        let a = (gamma * p / rho).sqrt();
        let mut props = pack(p, 300.0, rho);
        props.a = mps(a);
        let state = ThermoState::from_parts(
            StateInput::PT {
                p: pa(p),
                t: k(300.0),
            },
            Composition::pure(Species::N2),
            props,
        )
        .unwrap();
        assert!((state.isentropic_exponent() - gamma).abs() < 1e-12);
    }
}
