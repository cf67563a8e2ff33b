//! CoolProp-based fluid property model.

use std::collections::HashMap;

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, ThermoPropertyPack, validation};
use crate::state::{StateInput, ThermoState};
use crate::transport;
use cc_core::constants::R_UNIVERSAL;
use cc_core::units::{k, kgpm3, mps, pa, pa_s};
use rfluids::prelude::*;

/// CoolProp backend for fluid properties.
///
/// Pure fluids use the reference Helmholtz equations directly. Mixtures go
/// through CoolProp's multi-fluid model, which converges reliably for PT and
/// less so for the other pairs; failures surface as [`FluidError::Backend`].
///
/// Thread-safe: every call builds its own rfluids `Fluid`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoolPropModel;

impl CoolPropModel {
    pub fn new() -> Self {
        Self
    }

    fn undefined_fluid(&self, comp: &Composition) -> FluidResult<Fluid<Undefined>> {
        if let Some(species) = comp.is_pure() {
            return Ok(Fluid::from(species.rfluids_pure()));
        }
        let components: HashMap<Pure, f64> = comp
            .iter()
            .map(|(s, x)| (s.rfluids_pure(), x))
            .collect();
        let mix = CustomMix::mole_based(components).map_err(|e| FluidError::Backend {
            message: format!("invalid mixture {comp}: {e}"),
        })?;
        Fluid::try_from(mix).map_err(|e| FluidError::Backend {
            message: format!("CoolProp rejected mixture {comp}: {e}"),
        })
    }

    fn defined_fluid(&self, input: StateInput, comp: &Composition) -> FluidResult<Fluid> {
        let (first, second) = match input {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p)?;
                validation::validate_temperature(t)?;
                (FluidInput::pressure(p.value), FluidInput::temperature(t.value))
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p)?;
                validation::validate_enthalpy(h)?;
                (FluidInput::pressure(p.value), FluidInput::enthalpy(h))
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_entropy(s)?;
                (FluidInput::pressure(p.value), FluidInput::entropy(s))
            }
            StateInput::HS { h, s } => {
                validation::validate_enthalpy(h)?;
                validation::validate_entropy(s)?;
                (FluidInput::enthalpy(h), FluidInput::entropy(s))
            }
            StateInput::DP { rho, p } => {
                validation::validate_density(rho)?;
                validation::validate_pressure(p)?;
                (FluidInput::density(rho.value), FluidInput::pressure(p.value))
            }
            StateInput::DT { rho, t } => {
                validation::validate_density(rho)?;
                validation::validate_temperature(t)?;
                (FluidInput::density(rho.value), FluidInput::temperature(t.value))
            }
            StateInput::DS { rho, s } => {
                validation::validate_density(rho)?;
                validation::validate_entropy(s)?;
                (FluidInput::density(rho.value), FluidInput::entropy(s))
            }
            StateInput::DH { rho, h } => {
                validation::validate_density(rho)?;
                validation::validate_enthalpy(h)?;
                (FluidInput::density(rho.value), FluidInput::enthalpy(h))
            }
        };

        self.undefined_fluid(comp)?
            .in_state(first, second)
            .map_err(|e| FluidError::Backend {
                message: format!("rfluids {} flash failed for {comp}: {e}", input.label()),
            })
    }

    fn property_pack(fluid: &mut Fluid, comp: &Composition) -> FluidResult<ThermoPropertyPack> {
        fn get(r: Result<f64, impl std::fmt::Display>, what: &str) -> FluidResult<f64> {
            r.map_err(|e| FluidError::Backend {
                message: format!("rfluids error getting {what}: {e}"),
            })
        }

        let p = get(fluid.pressure(), "pressure")?;
        let t = get(fluid.temperature(), "temperature")?;
        let rho = get(fluid.density(), "density")?;
        let h = get(fluid.enthalpy(), "enthalpy")?;
        let s = get(fluid.entropy(), "entropy")?;
        let cp = get(fluid.specific_heat(), "cp")?;
        let cv = get(fluid.specific_heat_const_volume(), "cv")?;
        let a = get(fluid.sound_speed(), "sound speed")?;
        // CoolProp has no viscosity model for several of the mixtures seen in
        // test gases; the dilute-gas estimate is used there.
        let mu = match fluid.dynamic_viscosity() {
            Ok(mu) => mu,
            Err(e) => {
                tracing::debug!(%comp, error = %e, "using dilute-gas viscosity estimate");
                transport::mixture_viscosity(comp, t)
            }
        };
        let molar_mass = comp.molar_mass();
        let z = p * molar_mass * 1e-3 / (rho * R_UNIVERSAL * t);

        Ok(ThermoPropertyPack {
            p: pa(p),
            t: k(t),
            rho: kgpm3(rho),
            h,
            s,
            cp,
            cv,
            a: mps(a),
            mu: pa_s(mu),
            z,
            molar_mass,
        })
    }
}

impl FluidModel for CoolPropModel {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        !comp.is_empty()
    }

    fn state(&self, input: StateInput, comp: Composition) -> FluidResult<ThermoState> {
        let mut fluid = self.defined_fluid(input, &comp)?;
        let props = Self::property_pack(&mut fluid, &comp)?;
        ThermoState::from_parts(input, comp, props)
    }
}
