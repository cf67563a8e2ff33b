//! Discharge-state closure for each [`PointInput`] variant.

use crate::error::{PerfError, PerfResult};
use crate::point::{PerfContext, PointInput};
use cc_core::units::{kgpm3, pa};
use cc_fluids::{StateInput, ThermoState};
use cc_solver::newton_scalar;

/// Solve for the discharge state; returns `(suction, discharge)`.
pub(crate) fn close(
    ctx: &PerfContext<'_>,
    input: PointInput,
) -> PerfResult<(ThermoState, ThermoState)> {
    match input {
        PointInput::DischSuc { suc, disch } => {
            if suc.composition() != disch.composition() {
                return Err(PerfError::InvalidInputCombination {
                    what: "suction and discharge compositions differ".to_string(),
                });
            }
            Ok((suc, disch))
        }
        PointInput::EffSucVolumeRatio {
            suc,
            eff,
            volume_ratio,
        } => {
            check_eff(eff)?;
            if !(volume_ratio.is_finite() && volume_ratio > 1.0) {
                return Err(PerfError::InvalidArg {
                    what: "volume ratio must be greater than 1",
                });
            }
            let disch = eff_volume_ratio(ctx, &suc, eff, volume_ratio)?;
            Ok((suc, disch))
        }
        PointInput::EffHeadSuc { suc, eff, head } => {
            check_eff(eff)?;
            if !(head.is_finite() && head > 0.0) {
                return Err(PerfError::InvalidArg {
                    what: "head must be positive",
                });
            }
            let disch = eff_head(ctx, &suc, eff, head)?;
            Ok((suc, disch))
        }
        PointInput::EffDischPressureSuc { suc, eff, disch_p } => {
            check_eff(eff)?;
            if !(disch_p.value.is_finite() && disch_p > suc.p()) {
                return Err(PerfError::InvalidArg {
                    what: "discharge pressure must exceed suction pressure",
                });
            }
            let disch = eff_disch_pressure(ctx, &suc, eff, disch_p.value)?;
            Ok((suc, disch))
        }
    }
}

fn check_eff(eff: f64) -> PerfResult<()> {
    if eff.is_finite() && eff > 0.0 && eff <= 1.0 {
        Ok(())
    } else {
        Err(PerfError::InvalidArg {
            what: "efficiency must lie in (0, 1]",
        })
    }
}

/// Discharge density is fixed; iterate on discharge pressure from the
/// isentropic state at that density until the efficiency matches.
fn eff_volume_ratio(
    ctx: &PerfContext<'_>,
    suc: &ThermoState,
    eff: f64,
    volume_ratio: f64,
) -> PerfResult<ThermoState> {
    let rho = kgpm3(suc.rho().value * volume_ratio);
    let disch_at = |p: f64| -> PerfResult<ThermoState> {
        Ok(suc.update(ctx.fluid, StateInput::DP { rho, p: pa(p) })?)
    };

    let isentropic = suc.update(ctx.fluid, StateInput::DS { rho, s: suc.s() })?;
    let root = newton_scalar(
        "EffSucVolumeRatio discharge pressure",
        isentropic.p().value,
        &ctx.newton,
        |p| Ok::<_, PerfError>(ctx.method.evaluate(ctx.fluid, suc, &disch_at(p)?)?.eff - eff),
    )?;
    disch_at(root.x)
}

/// Discharge enthalpy follows from head / eff; iterate on discharge pressure
/// along that enthalpy until the head matches.
fn eff_head(
    ctx: &PerfContext<'_>,
    suc: &ThermoState,
    eff: f64,
    head: f64,
) -> PerfResult<ThermoState> {
    let h = suc.h() + head / eff;
    let disch_at = |p: f64| -> PerfResult<ThermoState> {
        Ok(suc.update(ctx.fluid, StateInput::PH { p: pa(p), h })?)
    };

    let isentropic = suc.update(ctx.fluid, StateInput::HS { h, s: suc.s() })?;
    let root = newton_scalar(
        "EffHeadSuc discharge pressure",
        isentropic.p().value,
        &ctx.newton,
        |p| {
            Ok::<_, PerfError>(
                (ctx.method.evaluate(ctx.fluid, suc, &disch_at(p)?)?.head - head) / eff,
            )
        },
    )?;
    disch_at(root.x)
}

/// Discharge pressure is fixed; iterate on the enthalpy rise.
fn eff_disch_pressure(
    ctx: &PerfContext<'_>,
    suc: &ThermoState,
    eff: f64,
    p: f64,
) -> PerfResult<ThermoState> {
    let disch_at = |dh: f64| -> PerfResult<ThermoState> {
        Ok(suc.update(
            ctx.fluid,
            StateInput::PH {
                p: pa(p),
                h: suc.h() + dh,
            },
        )?)
    };

    let isentropic = suc.update(ctx.fluid, StateInput::PS { p: pa(p), s: suc.s() })?;
    let dh0 = (isentropic.h() - suc.h()) / eff;
    let root = newton_scalar(
        "EffDischPressureSuc enthalpy rise",
        dh0,
        &ctx.newton,
        |dh| Ok::<_, PerfError>(ctx.method.evaluate(ctx.fluid, suc, &disch_at(dh)?)?.eff - eff),
    )?;
    disch_at(root.x)
}
