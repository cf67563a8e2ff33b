//! Bearing mechanical losses from the oil calorimetric balance.

use cc_core::constants::T_ZERO_C;
use cc_core::units::{
    AngularVelocity, Density, Power, Temperature, VolumeRate, k, watts,
};

use crate::error::{CompressorError, CompressorResult};

/// Volumetric expansion coefficient of mineral oil [1/K].
const OIL_EXPANSION: f64 = 0.000_65;
const WATER_DENSITY_15C: f64 = 999.0;

/// ISO viscosity grade of a turbine oil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsoVg {
    Vg32,
    Vg46,
    Vg68,
}

impl IsoVg {
    /// Density at 15 °C [kg/m³].
    pub fn density_15c(&self) -> f64 {
        match self {
            IsoVg::Vg32 => 857.0,
            IsoVg::Vg46 => 861.0,
            IsoVg::Vg68 => 865.0,
        }
    }
}

/// How oil density and specific heat are obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OilProperties {
    /// Fixed density and specific heat [J/(kg·K)].
    Fixed { rho: Density, cp: f64 },
    /// Grade correlation evaluated at the mean oil temperature.
    Iso(IsoVg),
}

impl Default for OilProperties {
    fn default() -> Self {
        OilProperties::Iso(IsoVg::Vg32)
    }
}

impl OilProperties {
    /// Density [kg/m³] and specific heat [J/(kg·K)] at `t`.
    pub fn at(&self, t: Temperature) -> (f64, f64) {
        match *self {
            OilProperties::Fixed { rho, cp } => (rho.value, cp),
            OilProperties::Iso(grade) => {
                let t_c = t.value - T_ZERO_C;
                let rho15 = grade.density_15c();
                let rho = rho15 * (1.0 - OIL_EXPANSION * (t_c - 15.0));
                // Cragoe, kJ/(kg·K)
                let cp = (1.684 + 0.003_39 * t_c) / (rho15 / WATER_DENSITY_15C).sqrt();
                (rho, cp * 1e3)
            }
        }
    }
}

/// Oil flow through one bearing and its drain temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OilStream {
    pub flow: VolumeRate,
    pub t_out: Temperature,
}

/// Oil measurements for the journal bearings at both ends and the thrust
/// bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BearingOil {
    pub t_in: Temperature,
    pub journal_de: Option<OilStream>,
    pub journal_nde: Option<OilStream>,
    pub thrust: Option<OilStream>,
    pub properties: OilProperties,
}

impl BearingOil {
    /// Heat picked up by the oil, `Σ rho Q cp (T_out - T_in)`.
    pub fn loss(&self) -> CompressorResult<Power> {
        let streams: Vec<&OilStream> = [&self.journal_de, &self.journal_nde, &self.thrust]
            .into_iter()
            .flatten()
            .collect();
        if streams.is_empty() {
            return Err(CompressorError::MissingAuxiliaryData {
                what: "bearing oil flows",
            });
        }

        let mut total = 0.0;
        for s in streams {
            if !(s.flow.value.is_finite() && s.flow.value >= 0.0) {
                return Err(CompressorError::InvalidArg {
                    what: "oil flow must be non-negative",
                });
            }
            let t_mean = k((self.t_in.value + s.t_out.value) / 2.0);
            let (rho, cp) = self.properties.at(t_mean);
            total += rho * s.flow.value * cp * (s.t_out.value - self.t_in.value);
        }
        Ok(watts(total))
    }
}

/// Bearing loss carried to another speed (quadratic in speed).
pub fn scale_loss(loss: Power, speed_test: AngularVelocity, speed: AngularVelocity) -> Power {
    let r = speed.value / speed_test.value;
    watts(loss.value * r * r)
}
