//! Flow and energy balances between flange and rotor.
//!
//! Flange points are what the test rig measures; rotor points are what the
//! impellers see once balance-line recirculation, seal gas and division-wall
//! leakage are accounted for.

use cc_core::units::{Power, Pressure, Temperature, k, pa, watts};
use cc_fluids::{FluidModel, StateInput, ThermoState};
use cc_solver::{FixedPointConfig, fixed_point};

use crate::error::{CompressorError, CompressorResult};
use crate::section::{CasingHeat, SealGas, SealUpstream};

/// Share of the injected seal gas that enters the process.
pub const SEAL_GAS_TO_PROCESS: f64 = 0.95;

/// Natural-convection coefficient for casing heat loss [W/(m²·K)].
pub const CASING_HTC: f64 = 13.6;

/// Seal gas entering the process, split between the suction end and the
/// balance-piston end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealGasSplit {
    /// Flow entering the first suction [kg/s]
    pub suction: f64,
    /// Flow entering the balance-piston end [kg/s]
    pub end: f64,
    pub t: Temperature,
}

impl SealGasSplit {
    pub fn new(seal_gas: Option<&SealGas>) -> Self {
        match seal_gas {
            Some(sg) => {
                let half = SEAL_GAS_TO_PROCESS * sg.flow.value / 2.0;
                Self {
                    suction: half,
                    end: half,
                    t: sg.t,
                }
            }
            None => Self {
                suction: 0.0,
                end: 0.0,
                t: k(0.0),
            },
        }
    }

    /// Seal-gas enthalpy at pressure `p`.
    fn h_at(&self, model: &dyn FluidModel, like: &ThermoState, p: Pressure) -> CompressorResult<f64> {
        Ok(like.update(model, StateInput::PT { p, t: self.t })?.h())
    }
}

/// Leakage recirculated through the balance line: balance-piston leakage
/// mixed with the end seal gas, at the seal upstream pressure.
#[derive(Debug, Clone)]
pub struct EndStream {
    /// Total balance-line flow [kg/s]
    pub flow: f64,
    /// Process gas leaking across the balance piston [kg/s]
    pub balance_piston: f64,
    pub state: ThermoState,
}

/// Mix the balance-piston leakage from `upstream` with the end seal gas.
/// Returns `None` when there is no balance-line flow.
pub fn end_stream(
    model: &dyn FluidModel,
    upstream: &ThermoState,
    flow: f64,
    seal_gas: &SealGasSplit,
) -> CompressorResult<Option<EndStream>> {
    if flow <= 0.0 {
        return Ok(None);
    }
    let balance_piston = (flow - seal_gas.end).max(0.0);
    let seal_share = flow - balance_piston;
    let h_seal = if seal_share > 0.0 {
        seal_gas.h_at(model, upstream, upstream.p())?
    } else {
        0.0
    };
    let h = (balance_piston * upstream.h() + seal_share * h_seal) / flow;
    let state = upstream.update(model, StateInput::PH { p: upstream.p(), h })?;
    Ok(Some(EndStream {
        flow,
        balance_piston,
        state,
    }))
}

/// Rotor suction: the flange suction stream, which already carries the
/// balance-line return, mixed adiabatically with the suction-end seal gas
/// throttled from its supply pressure `supply_p`. Returns the rotor suction
/// state and rotor flow [kg/s].
pub fn mix_suction(
    model: &dyn FluidModel,
    flange_suc: &ThermoState,
    flange_flow: f64,
    balance_line_flow: f64,
    seal_gas: &SealGasSplit,
    supply_p: Pressure,
) -> CompressorResult<(ThermoState, f64)> {
    let stream = flange_flow + balance_line_flow;
    if seal_gas.suction <= 0.0 {
        return Ok((flange_suc.clone(), stream));
    }
    let flow = stream + seal_gas.suction;
    let energy =
        stream * flange_suc.h() + seal_gas.suction * seal_gas.h_at(model, flange_suc, supply_p)?;
    let state = flange_suc.update(
        model,
        StateInput::PH {
            p: flange_suc.p(),
            h: energy / flow,
        },
    )?;
    Ok((state, flow))
}

/// Upstream seal state: the measured conditions when given, `default`
/// otherwise.
pub fn seal_upstream_state(
    model: &dyn FluidModel,
    measured: Option<&SealUpstream>,
    default: &ThermoState,
) -> CompressorResult<ThermoState> {
    match measured {
        Some(m) => Ok(default.update(model, StateInput::PT { p: m.p, t: m.t })?),
        None => Ok(default.clone()),
    }
}

fn seal_terms(upstream: &ThermoState, p_down: Pressure) -> CompressorResult<(f64, f64)> {
    let p_up = upstream.p().value;
    let ratio = p_down.value / p_up;
    if !(ratio < 1.0 && ratio >= 0.0) {
        return Err(CompressorError::InvalidArg {
            what: "seal upstream pressure must exceed downstream pressure",
        });
    }
    let gas = (upstream.compressibility_factor() * upstream.t().value / upstream.molar_mass()).sqrt();
    Ok((gas, p_up * (1.0 - ratio * ratio).sqrt()))
}

/// Seal flow coefficient `k = m sqrt(z T / MW) / (p_up sqrt(1 - (p_down/p_up)²))`
/// with the gas term and `p_up` from `upstream`, the end state of the
/// balance line.
pub fn seal_coefficient(
    flow: f64,
    upstream: &ThermoState,
    p_down: Pressure,
) -> CompressorResult<f64> {
    let (gas, drive) = seal_terms(upstream, p_down)?;
    Ok(flow * gas / drive)
}

/// Seal flow [kg/s] predicted from a coefficient.
pub fn seal_flow(k_seal: f64, upstream: &ThermoState, p_down: Pressure) -> CompressorResult<f64> {
    let (gas, drive) = seal_terms(upstream, p_down)?;
    Ok(k_seal * drive / gas)
}

/// Balance-line stream at other conditions from a seal coefficient. The gas
/// term is taken from the end state, which itself depends on the flow through
/// the seal-gas share, so the flow is iterated.
pub fn predict_end_stream(
    model: &dyn FluidModel,
    k_seal: f64,
    upstream: &ThermoState,
    p_down: Pressure,
    seal_gas: &SealGasSplit,
) -> CompressorResult<Option<EndStream>> {
    let config = FixedPointConfig {
        abs_tol: 1e-10,
        ..FixedPointConfig::default()
    };
    let root = fixed_point(
        "balance-line flow",
        seal_flow(k_seal, upstream, p_down)?,
        &config,
        |m| -> CompressorResult<f64> {
            let end = end_stream(model, upstream, m, seal_gas)?;
            seal_flow(k_seal, end.as_ref().map_or(upstream, |e| &e.state), p_down)
        },
    )?;
    end_stream(model, upstream, root.x, seal_gas)
}

/// Heat lost through the casing at the measured temperatures.
pub fn casing_heat_loss(casing: &CasingHeat) -> Power {
    watts(
        CASING_HTC * casing.area.value * (casing.t_casing.value - casing.t_ambient.value),
    )
}

/// Casing heat loss at another rotor discharge temperature, keeping the
/// measured casing-to-rotor-discharge temperature offset.
pub fn casing_heat_loss_at(
    casing: &CasingHeat,
    t_rotor_test: Temperature,
    t_rotor: Temperature,
) -> Power {
    let t_casing = t_rotor.value + (casing.t_casing.value - t_rotor_test.value);
    casing_heat_loss(&CasingHeat {
        t_casing: k(t_casing),
        ..*casing
    })
}

/// State at `like.p()` with enthalpy shifted by `dh`.
pub fn shift_enthalpy(
    model: &dyn FluidModel,
    like: &ThermoState,
    dh: f64,
) -> CompressorResult<ThermoState> {
    if dh == 0.0 {
        return Ok(like.clone());
    }
    Ok(like.update(
        model,
        StateInput::PH {
            p: like.p(),
            h: like.h() + dh,
        },
    )?)
}

/// State at pressure `p` with enthalpy `h`.
pub fn state_ph(
    model: &dyn FluidModel,
    like: &ThermoState,
    p: f64,
    h: f64,
) -> CompressorResult<ThermoState> {
    Ok(like.update(model, StateInput::PH { p: pa(p), h })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_core::units::{bar, kgps, m2};
    use cc_fluids::{Composition, PengRobinsonModel, Species};

    fn n2(model: &PengRobinsonModel, p_bar: f64, t: f64) -> ThermoState {
        model
            .state(
                StateInput::PT {
                    p: bar(p_bar),
                    t: k(t),
                },
                Composition::pure(Species::N2),
            )
            .unwrap()
    }

    #[test]
    fn seal_gas_split_keeps_five_percent_out() {
        let split = SealGasSplit::new(Some(&SealGas {
            flow: kgps(0.1),
            t: k(300.0),
        }));
        assert!((split.suction + split.end - 0.095).abs() < 1e-15);
        assert_eq!(split.suction, split.end);
    }

    #[test]
    fn end_stream_without_seal_gas_is_discharge_gas() {
        let model = PengRobinsonModel::new();
        let disch = n2(&model, 4.0, 420.0);
        let end = end_stream(&model, &disch, 0.1, &SealGasSplit::new(None))
            .unwrap()
            .unwrap();
        assert_eq!(end.balance_piston, 0.1);
        assert!((end.state.t().value - 420.0).abs() < 1e-6);
        assert!(end_stream(&model, &disch, 0.0, &SealGasSplit::new(None)).unwrap().is_none());
    }

    #[test]
    fn seal_gas_larger_than_balance_flow_limits_piston_leak() {
        let model = PengRobinsonModel::new();
        let disch = n2(&model, 4.0, 420.0);
        let split = SealGasSplit::new(Some(&SealGas {
            flow: kgps(1.0),
            t: k(300.0),
        }));
        let end = end_stream(&model, &disch, 0.1, &split).unwrap().unwrap();
        assert_eq!(end.balance_piston, 0.0);
        assert!((end.state.t().value - 300.0).abs() < 1e-6);
    }

    #[test]
    fn suction_mix_adds_throttled_seal_gas() {
        let model = PengRobinsonModel::new();
        let suc = n2(&model, 1.0, 300.0);
        let split = SealGasSplit::new(Some(&SealGas {
            flow: kgps(2.0 / 0.95),
            t: k(400.0),
        }));
        let (mixed, flow) = mix_suction(&model, &suc, 2.5, 0.5, &split, bar(1.0)).unwrap();
        assert!((flow - 4.0).abs() < 1e-12);
        // Near-ideal gas with nearly constant cp: mix close to 325 K
        assert!((mixed.t().value - 325.0).abs() < 0.5, "{}", mixed.t().value);

        // Supplied at a higher pressure the seal gas arrives cooler.
        let (throttled, _) = mix_suction(&model, &suc, 2.5, 0.5, &split, bar(20.0)).unwrap();
        assert!(throttled.t() < mixed.t());

        let (plain, flow) =
            mix_suction(&model, &suc, 3.0, 0.2, &SealGasSplit::new(None), bar(4.0)).unwrap();
        assert_eq!(plain.t(), suc.t());
        assert!((flow - 3.2).abs() < 1e-12);
    }

    #[test]
    fn predicted_end_stream_recovers_measured_flow() {
        let model = PengRobinsonModel::new();
        let disch = n2(&model, 4.0, 420.0);
        let split = SealGasSplit::new(Some(&SealGas {
            flow: kgps(0.05),
            t: k(300.0),
        }));
        let end = end_stream(&model, &disch, 0.1, &split).unwrap().unwrap();
        let kc = seal_coefficient(0.1, &end.state, bar(1.0)).unwrap();
        let predicted = predict_end_stream(&model, kc, &disch, bar(1.0), &split)
            .unwrap()
            .unwrap();
        assert!((predicted.flow - 0.1).abs() < 1e-9, "{}", predicted.flow);
        assert!((predicted.balance_piston - end.balance_piston).abs() < 1e-9);
    }

    #[test]
    fn seal_flow_inverts_coefficient() {
        let model = PengRobinsonModel::new();
        let up = n2(&model, 4.0, 420.0);
        let kc = seal_coefficient(0.12, &up, bar(1.0)).unwrap();
        let back = seal_flow(kc, &up, bar(1.0)).unwrap();
        assert!((back - 0.12).abs() < 1e-12);

        let higher = n2(&model, 6.0, 420.0);
        assert!(seal_flow(kc, &higher, bar(1.0)).unwrap() > 0.12);
        assert!(seal_coefficient(0.1, &up, bar(5.0)).is_err());
    }

    #[test]
    fn casing_loss_uses_convection_coefficient() {
        let casing = CasingHeat {
            area: m2(5.0),
            t_casing: k(330.0),
            t_ambient: k(300.0),
        };
        assert!((casing_heat_loss(&casing).value - 13.6 * 5.0 * 30.0).abs() < 1e-9);
        let shifted = casing_heat_loss_at(&casing, k(400.0), k(410.0));
        assert!((shifted.value - 13.6 * 5.0 * 40.0).abs() < 1e-9);
    }
}
