//! Polytropic head and efficiency between two states.
//!
//! The methods differ only in how the compression path between the measured
//! suction and discharge states is approximated. All of them return the head
//! and `eff = head / (h_d - h_s)`.

use std::fmt;
use std::str::FromStr;

use crate::error::{PerfError, PerfResult};
use cc_fluids::{FluidModel, StateInput, ThermoState};
use cc_solver::{FixedPointConfig, NewtonConfig, fixed_point, newton_scalar};

/// Number of pressure steps used by [`PolytropicMethod::SandbergColbyMultistep`].
const MULTISTEP_STEPS: usize = 10;

/// Polytropic correlation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolytropicMethod {
    /// Average exponent with the Schultz correction factor.
    #[default]
    Schultz,
    /// Simpson integration of v dp with a constant-efficiency mid-point.
    Huntington,
    /// Temperature linear in entropy along the path.
    MallenSaville,
    /// Log-mean temperature along the path.
    SandbergColby,
    /// Ten geometric pressure steps at constant stage efficiency.
    SandbergColbyMultistep,
}

impl PolytropicMethod {
    pub const ALL: [PolytropicMethod; 5] = [
        PolytropicMethod::Schultz,
        PolytropicMethod::Huntington,
        PolytropicMethod::MallenSaville,
        PolytropicMethod::SandbergColby,
        PolytropicMethod::SandbergColbyMultistep,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PolytropicMethod::Schultz => "schultz",
            PolytropicMethod::Huntington => "huntington",
            PolytropicMethod::MallenSaville => "mallen_saville",
            PolytropicMethod::SandbergColby => "sandberg_colby",
            PolytropicMethod::SandbergColbyMultistep => "sandberg_colby_multistep",
        }
    }

    /// Polytropic head [J/kg] and efficiency from suction to discharge.
    pub fn evaluate(
        &self,
        model: &dyn FluidModel,
        suc: &ThermoState,
        disch: &ThermoState,
    ) -> PerfResult<PolytropicHead> {
        let dh = disch.h() - suc.h();
        if dh.is_nan() || dh <= 0.0 || disch.p() <= suc.p() {
            return Err(PerfError::NonPhysical {
                what: format!(
                    "discharge must be above suction (dh = {dh:.3} J/kg, p_d = {:.1} Pa, p_s = {:.1} Pa)",
                    disch.p().value,
                    suc.p().value
                ),
            });
        }

        let head = match self {
            PolytropicMethod::Schultz => schultz_head(model, suc, disch)?,
            PolytropicMethod::MallenSaville => {
                dh - (disch.s() - suc.s()) * (suc.t().value + disch.t().value) / 2.0
            }
            PolytropicMethod::SandbergColby => sandberg_colby_head(suc, disch, dh),
            PolytropicMethod::Huntington => huntington_head(model, suc, disch, dh)?,
            PolytropicMethod::SandbergColbyMultistep => multistep_head(model, suc, disch, dh)?,
        };

        if !head.is_finite() || head <= 0.0 {
            return Err(PerfError::NonPhysical {
                what: format!("{} head is {head}", self.key()),
            });
        }
        Ok(PolytropicHead {
            head,
            eff: head / dh,
        })
    }
}

impl fmt::Display for PolytropicMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PolytropicMethod {
    type Err = PerfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        PolytropicMethod::ALL
            .into_iter()
            .find(|m| m.key() == norm)
            .ok_or(PerfError::InvalidArg {
                what: "unknown polytropic method",
            })
    }
}

/// Head and efficiency from a correlation strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolytropicHead {
    /// Polytropic head [J/kg]
    pub head: f64,
    pub eff: f64,
}

/// Polytropic volume exponent n = ln(p2/p1) / ln(v1/v2).
pub fn polytropic_exponent(suc: &ThermoState, disch: &ThermoState) -> f64 {
    (disch.p().value / suc.p().value).ln() / (disch.rho().value / suc.rho().value).ln()
}

fn isentropic_at(
    model: &dyn FluidModel,
    suc: &ThermoState,
    p: f64,
) -> PerfResult<ThermoState> {
    Ok(suc.update(
        model,
        StateInput::PS {
            p: cc_core::units::pa(p),
            s: suc.s(),
        },
    )?)
}

fn schultz_head(model: &dyn FluidModel, suc: &ThermoState, disch: &ThermoState) -> PerfResult<f64> {
    let disch_s = isentropic_at(model, suc, disch.p().value)?;
    let (p1, v1) = (suc.p().value, suc.v());
    let (p2, v2, v2s) = (disch.p().value, disch.v(), disch_s.v());

    let n = polytropic_exponent(suc, disch);
    let ns = polytropic_exponent(suc, &disch_s);
    let head_pol = n / (n - 1.0) * (p2 * v2 - p1 * v1);
    let head_isen = ns / (ns - 1.0) * (p2 * v2s - p1 * v1);
    let f = (disch_s.h() - suc.h()) / head_isen;
    Ok(f * head_pol)
}

fn sandberg_colby_head(suc: &ThermoState, disch: &ThermoState, dh: f64) -> f64 {
    let (t1, t2) = (suc.t().value, disch.t().value);
    let t_mean = if (t2 - t1).abs() < 1e-9 * t1 {
        t1
    } else {
        (t2 - t1) / (t2 / t1).ln()
    };
    dh - (disch.s() - suc.s()) * t_mean
}

/// Enthalpy reached from `from` at pressure `p` through an isentropic
/// increment divided by `eff`.
fn stage_enthalpy(
    model: &dyn FluidModel,
    from: &ThermoState,
    p: f64,
    eff: f64,
) -> PerfResult<(f64, f64)> {
    let iso = isentropic_at(model, from, p)?;
    let dh_s = iso.h() - from.h();
    Ok((from.h() + dh_s / eff, dh_s))
}

fn huntington_head(
    model: &dyn FluidModel,
    suc: &ThermoState,
    disch: &ThermoState,
    dh: f64,
) -> PerfResult<f64> {
    let (p1, p2) = (suc.p().value, disch.p().value);
    let p_mid = (p1 * p2).sqrt();
    let ln_ratio = (p2 / p1).ln();

    let simpson = |eff: f64| -> PerfResult<f64> {
        let (h_mid, _) = stage_enthalpy(model, suc, p_mid, eff)?;
        let mid = suc.update(
            model,
            StateInput::PH {
                p: cc_core::units::pa(p_mid),
                h: h_mid,
            },
        )?;
        Ok(ln_ratio / 6.0 * (p1 * suc.v() + 4.0 * p_mid * mid.v() + p2 * disch.v()))
    };

    let eff0 = sandberg_colby_head(suc, disch, dh) / dh;
    let config = FixedPointConfig {
        max_iterations: 30,
        abs_tol: 1e-10,
    };
    let root = fixed_point("Huntington efficiency", eff0, &config, |eff| {
        Ok::<_, PerfError>(simpson(eff)? / dh)
    })?;
    simpson(root.x)
}

fn multistep_head(
    model: &dyn FluidModel,
    suc: &ThermoState,
    disch: &ThermoState,
    dh: f64,
) -> PerfResult<f64> {
    let (p1, p2) = (suc.p().value, disch.p().value);
    let step_ratio = (p2 / p1).powf(1.0 / MULTISTEP_STEPS as f64);

    // Marches the path at stage efficiency `eff`; returns (end enthalpy, Σ dh_s).
    let march = |eff: f64| -> PerfResult<(f64, f64)> {
        let mut state = suc.clone();
        let mut head = 0.0;
        let mut p = p1;
        for i in 0..MULTISTEP_STEPS {
            p = if i + 1 == MULTISTEP_STEPS {
                p2
            } else {
                p * step_ratio
            };
            let (h_next, dh_s) = stage_enthalpy(model, &state, p, eff)?;
            head += dh_s;
            state = state.update(
                model,
                StateInput::PH {
                    p: cc_core::units::pa(p),
                    h: h_next,
                },
            )?;
        }
        Ok((state.h(), head))
    };

    let eff0 = sandberg_colby_head(suc, disch, dh) / dh;
    let config = NewtonConfig {
        step_tol: 1e-10,
        max_step_rel: 0.2,
        ..NewtonConfig::default()
    };
    let root = newton_scalar("multistep efficiency", eff0, &config, |eff| {
        Ok::<_, PerfError>((march(eff)?.0 - disch.h()) / dh)
    })?;
    Ok(march(root.x)?.1)
}
