//! Peng-Robinson mixture model.
//!
//! Van der Waals one-fluid mixing with zero binary interaction parameters,
//! ideal-gas heat capacities from the species polynomials and residual
//! properties from the analytic departure functions. Reference state: ideal
//! gas at `t_ref`, `p_ref` has zero enthalpy and zero entropy (plus the ideal
//! entropy of mixing).
//!
//! Every flash is a bounded Newton iteration on temperature (or on ln p for
//! the enthalpy-entropy pair) using analytic derivatives.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, ThermoPropertyPack, validation};
use crate::species::SpeciesConstants;
use crate::state::{StateInput, ThermoState, require_finite, require_positive};
use crate::transport;
use cc_core::constants::{P_ATM, R_UNIVERSAL as R};
use cc_core::units::{Pressure, Temperature, k, kgpm3, mps, pa, pa_s};

const SQRT2: f64 = std::f64::consts::SQRT_2;
const MAX_FLASH_ITER: usize = 100;
const T_REL_TOL: f64 = 1e-11;
const LN_P_TOL: f64 = 1e-10;

/// Peng-Robinson (1976) cubic equation of state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PengRobinsonModel {
    t_ref: f64,
    p_ref: f64,
}

impl Default for PengRobinsonModel {
    fn default() -> Self {
        Self {
            t_ref: 298.15,
            p_ref: P_ATM,
        }
    }
}

impl PengRobinsonModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different ideal-gas reference state for enthalpy and entropy.
    pub fn with_reference(t_ref: Temperature, p_ref: Pressure) -> Self {
        Self {
            t_ref: t_ref.value,
            p_ref: p_ref.value,
        }
    }

    fn mixture<'a>(&self, comp: &'a Composition) -> Mixture<'a> {
        let x: Vec<f64> = comp.iter().map(|(_, f)| f).collect();
        let c: Vec<&'static SpeciesConstants> = comp.iter().map(|(s, _)| s.constants()).collect();
        let s_mix = -R
            * x.iter()
                .filter(|xi| **xi > 0.0)
                .map(|xi| xi * xi.ln())
                .sum::<f64>();
        Mixture {
            comp,
            mw: comp.molar_mass() * 1e-3,
            x,
            c,
            s_mix,
            t_ref: self.t_ref,
            p_ref: self.p_ref,
        }
    }
}

/// Temperature-dependent mixture parameters and their T-derivatives (molar).
struct Attraction {
    a: f64,
    da: f64,
    d2a: f64,
    b: f64,
}

/// Molar properties at one (T, v) point.
struct MolarState {
    t: f64,
    v: f64,
    p: f64,
    h: f64,
    s: f64,
    cv: f64,
    cp: f64,
    dpdt: f64,
    dpdv: f64,
}

struct Mixture<'a> {
    comp: &'a Composition,
    x: Vec<f64>,
    c: Vec<&'static SpeciesConstants>,
    /// kg/mol
    mw: f64,
    s_mix: f64,
    t_ref: f64,
    p_ref: f64,
}

impl Mixture<'_> {
    fn cp_ig(&self, t: f64) -> f64 {
        self.x
            .iter()
            .zip(&self.c)
            .map(|(xi, c)| {
                let cp_r: f64 = c
                    .cp_r
                    .iter()
                    .enumerate()
                    .map(|(n, a)| a * t.powi(n as i32))
                    .sum();
                xi * cp_r
            })
            .sum::<f64>()
            * R
    }

    fn h_ig(&self, t: f64) -> f64 {
        let t0 = self.t_ref;
        self.x
            .iter()
            .zip(&self.c)
            .map(|(xi, c)| {
                let h_r: f64 = c
                    .cp_r
                    .iter()
                    .enumerate()
                    .map(|(n, a)| {
                        let e = n as i32 + 1;
                        a * (t.powi(e) - t0.powi(e)) / e as f64
                    })
                    .sum();
                xi * h_r
            })
            .sum::<f64>()
            * R
    }

    /// Ideal-gas entropy at (T, p_ref) relative to (t_ref, p_ref), without mixing.
    fn s_ig(&self, t: f64) -> f64 {
        let t0 = self.t_ref;
        self.x
            .iter()
            .zip(&self.c)
            .map(|(xi, c)| {
                let mut s_r = c.cp_r[0] * (t / t0).ln();
                for (n, a) in c.cp_r.iter().enumerate().skip(1) {
                    let e = n as i32;
                    s_r += a * (t.powi(e) - t0.powi(e)) / e as f64;
                }
                xi * s_r
            })
            .sum::<f64>()
            * R
    }

    fn attraction(&self, t: f64) -> Attraction {
        // With k_ij = 0 the quadratic mixing rule factors: a_m = (Σ x_i sqrt(a_i))²
        let (mut sum, mut dsum, mut d2sum, mut b) = (0.0, 0.0, 0.0, 0.0);
        for (xi, c) in self.x.iter().zip(&self.c) {
            let ac = 0.45724 * R * R * c.tc * c.tc / c.pc;
            let kappa = 0.37464 + 1.54226 * c.omega - 0.26992 * c.omega * c.omega;
            let u = 1.0 + kappa * (1.0 - (t / c.tc).sqrt());
            let du = -kappa / (2.0 * (t * c.tc).sqrt());
            let d2u = kappa / (4.0 * c.tc.sqrt() * t.powf(1.5));
            let root_ac = ac.sqrt();
            sum += xi * root_ac * u;
            dsum += xi * root_ac * du;
            d2sum += xi * root_ac * d2u;
            b += xi * 0.07780 * R * c.tc / c.pc;
        }
        Attraction {
            a: sum * sum,
            da: 2.0 * sum * dsum,
            d2a: 2.0 * (dsum * dsum + sum * d2sum),
            b,
        }
    }

    fn pressure(&self, t: f64, v: f64) -> f64 {
        let at = self.attraction(t);
        R * t / (v - at.b) - at.a / (v * v + 2.0 * at.b * v - at.b * at.b)
    }

    /// Largest real root of the cubic in Z.
    fn z_vapor(&self, p: f64, t: f64) -> FluidResult<f64> {
        let at = self.attraction(t);
        let a_big = at.a * p / (R * t).powi(2);
        let b_big = at.b * p / (R * t);
        let c2 = -(1.0 - b_big);
        let c1 = a_big - 3.0 * b_big * b_big - 2.0 * b_big;
        let c0 = -(a_big * b_big - b_big * b_big - b_big.powi(3));

        let mut z = 1.0_f64.max(2.0 * b_big);
        for _ in 0..MAX_FLASH_ITER {
            let f = ((z + c2) * z + c1) * z + c0;
            let df = (3.0 * z + 2.0 * c2) * z + c1;
            if df == 0.0 {
                break;
            }
            let dz = f / df;
            z -= dz;
            if dz.abs() < 1e-14 {
                if z <= b_big {
                    return Err(FluidError::NonPhysical {
                        what: "compressibility root below co-volume",
                    });
                }
                return Ok(z);
            }
        }
        Err(FluidError::ConvergenceFailed {
            what: "Peng-Robinson compressibility root",
        })
    }

    fn at_tv(&self, t: f64, v: f64) -> FluidResult<MolarState> {
        require_positive(t, "temperature must be positive and finite")?;
        let at = self.attraction(t);
        if !(v.is_finite() && v > at.b) {
            return Err(FluidError::NonPhysical {
                what: "molar volume below co-volume",
            });
        }
        let denom = v * v + 2.0 * at.b * v - at.b * at.b;
        let p = R * t / (v - at.b) - at.a / denom;
        require_positive(p, "pressure must be positive and finite")?;

        let log_term = ((v + (1.0 + SQRT2) * at.b) / (v + (1.0 - SQRT2) * at.b)).ln();
        let k_dep = log_term / (2.0 * SQRT2 * at.b);

        let h = self.h_ig(t) + p * v - R * t + (t * at.da - at.a) * k_dep;
        let s = self.s_ig(t) + R * ((v - at.b) * self.p_ref / (R * t)).ln() + at.da * k_dep
            + self.s_mix;
        let cv = self.cp_ig(t) - R + t * at.d2a * k_dep;
        let dpdt = R / (v - at.b) - at.da / denom;
        let dpdv = -R * t / (v - at.b).powi(2) + at.a * (2.0 * v + 2.0 * at.b) / (denom * denom);
        if dpdv >= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "mechanically unstable state (dP/dv >= 0)",
            });
        }
        let cp = cv - t * dpdt * dpdt / dpdv;

        Ok(MolarState {
            t,
            v,
            p,
            h: require_finite(h, "enthalpy must be finite")?,
            s: require_finite(s, "entropy must be finite")?,
            cv,
            cp,
            dpdt,
            dpdv,
        })
    }

    fn at_pt(&self, p: f64, t: f64) -> FluidResult<MolarState> {
        let z = self.z_vapor(p, t)?;
        self.at_tv(t, z * R * t / p)
    }

    /// Newton iteration on temperature at fixed pressure.
    ///
    /// `step` maps the current state and residual (target - value) to a
    /// correction of ln T.
    fn solve_t_at_p(
        &self,
        p: f64,
        target: f64,
        value: impl Fn(&MolarState) -> f64,
        step: impl Fn(&MolarState, f64) -> f64,
        what: &'static str,
    ) -> FluidResult<MolarState> {
        let mut t = self.t_ref;
        for _ in 0..MAX_FLASH_ITER {
            let st = self.at_pt(p, t)?;
            let dln_t = step(&st, target - value(&st)).clamp(-0.5, 0.5);
            t *= dln_t.exp();
            if dln_t.abs() < T_REL_TOL {
                return self.at_pt(p, t);
            }
        }
        Err(FluidError::ConvergenceFailed { what })
    }

    /// Newton iteration on temperature at fixed molar volume.
    fn solve_t_at_v(
        &self,
        v: f64,
        t0: f64,
        target: f64,
        value: impl Fn(&MolarState) -> f64,
        step: impl Fn(&MolarState, f64) -> f64,
        what: &'static str,
    ) -> FluidResult<MolarState> {
        let mut t = t0;
        for _ in 0..MAX_FLASH_ITER {
            let st = self.at_tv(t, v)?;
            let dln_t = step(&st, target - value(&st)).clamp(-0.5, 0.5);
            t *= dln_t.exp();
            if dln_t.abs() < T_REL_TOL {
                return self.at_tv(t, v);
            }
        }
        Err(FluidError::ConvergenceFailed { what })
    }

    fn flash(&self, input: StateInput) -> FluidResult<MolarState> {
        match input {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p)?;
                validation::validate_temperature(t)?;
                self.at_pt(p.value, t.value)
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p)?;
                validation::validate_enthalpy(h)?;
                let h_molar = h * self.mw;
                self.solve_t_at_p(
                    p.value,
                    h_molar,
                    |st| st.h,
                    |st, r| r / (st.cp * st.t),
                    "Peng-Robinson PH flash",
                )
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_entropy(s)?;
                let s_molar = s * self.mw;
                self.solve_t_at_p(
                    p.value,
                    s_molar,
                    |st| st.s,
                    |st, r| r / st.cp,
                    "Peng-Robinson PS flash",
                )
            }
            StateInput::HS { h, s } => {
                validation::validate_enthalpy(h)?;
                validation::validate_entropy(s)?;
                self.flash_hs(h * self.mw, s)
            }
            StateInput::DT { rho, t } => {
                validation::validate_density(rho)?;
                validation::validate_temperature(t)?;
                self.at_tv(t.value, self.mw / rho.value)
            }
            StateInput::DP { rho, p } => {
                validation::validate_density(rho)?;
                validation::validate_pressure(p)?;
                let v = self.mw / rho.value;
                self.solve_t_at_v(
                    v,
                    p.value * v / R,
                    p.value,
                    |st| st.p,
                    |st, r| r / (st.dpdt * st.t),
                    "Peng-Robinson DP flash",
                )
            }
            StateInput::DS { rho, s } => {
                validation::validate_density(rho)?;
                validation::validate_entropy(s)?;
                self.solve_t_at_v(
                    self.mw / rho.value,
                    self.t_ref,
                    s * self.mw,
                    |st| st.s,
                    |st, r| r / st.cv,
                    "Peng-Robinson DS flash",
                )
            }
            StateInput::DH { rho, h } => {
                validation::validate_density(rho)?;
                validation::validate_enthalpy(h)?;
                self.solve_t_at_v(
                    self.mw / rho.value,
                    self.t_ref,
                    h * self.mw,
                    |st| st.h,
                    |st, r| r / ((st.cv + st.v * st.dpdt) * st.t),
                    "Peng-Robinson DH flash",
                )
            }
        }
    }

    /// Newton iteration on ln p along the isentrope: (dh/d ln p)_s = p v.
    fn flash_hs(&self, h_molar: f64, s_mass: f64) -> FluidResult<MolarState> {
        let s_molar = s_mass * self.mw;
        let mut p = self.p_ref;
        for _ in 0..MAX_FLASH_ITER {
            let st = self.solve_t_at_p(
                p,
                s_molar,
                |st| st.s,
                |st, r| r / st.cp,
                "Peng-Robinson PS flash",
            )?;
            let dln_p = ((h_molar - st.h) / (st.p * st.v)).clamp(-2.0, 2.0);
            p *= dln_p.exp();
            if dln_p.abs() < LN_P_TOL {
                return Ok(st);
            }
        }
        Err(FluidError::ConvergenceFailed {
            what: "Peng-Robinson HS flash",
        })
    }

    fn pack(&self, st: &MolarState) -> ThermoPropertyPack {
        let a = (-st.v * st.v * (st.cp / st.cv) * st.dpdv / self.mw).sqrt();
        ThermoPropertyPack {
            p: pa(st.p),
            t: k(st.t),
            rho: kgpm3(self.mw / st.v),
            h: st.h / self.mw,
            s: st.s / self.mw,
            cp: st.cp / self.mw,
            cv: st.cv / self.mw,
            a: mps(a),
            mu: pa_s(transport::mixture_viscosity(self.comp, st.t)),
            z: st.p * st.v / (R * st.t),
            molar_mass: self.mw * 1e3,
        }
    }
}

impl FluidModel for PengRobinsonModel {
    fn name(&self) -> &str {
        "Peng-Robinson"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        !comp.is_empty()
    }

    fn state(&self, input: StateInput, comp: Composition) -> FluidResult<ThermoState> {
        let mix = self.mixture(&comp);
        let molar = mix.flash(input)?;
        let props = mix.pack(&molar);
        ThermoState::from_parts(input, comp, props)
    }
}

impl PengRobinsonModel {
    /// Pressure [Pa] at temperature [K] and density [kg/m³], without building a state.
    pub fn pressure_at(&self, comp: &Composition, t: f64, rho: f64) -> f64 {
        let mix = self.mixture(comp);
        mix.pressure(t, mix.mw / rho)
    }
}
