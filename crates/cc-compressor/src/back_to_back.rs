//! Back-to-back compressor assembly: two sections on one shaft.
//!
//! The end seal leaks from the second-section suction back to the
//! first-section suction through the balance line. The division wall leaks
//! from the second-section discharge into the first-section discharge.

use cc_core::units::{AngularVelocity, Power, k, rad_per_s, to_rpm, watts};
use cc_fluids::{StateInput, ThermoState};
use cc_point::{Curve, PerfContext, Point, PolytropicMethod, convert_from, mach_deviation};
use cc_solver::{FixedPointConfig, fixed_point};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::CorrectionConfig;
use crate::conversion::{
    ConvertedPoint, GuaranteeRatios, bearing_loss, bearing_loss_at, casing_data,
    convert_options, equivalent_speed, flange_discharge_sp, mean_loss, point_like,
    rotor_discharge_test,
};
use crate::error::{CompressorError, CompressorResult};
use crate::leakage::{
    SealGasSplit, casing_heat_loss_at, end_stream, mix_suction, predict_end_stream,
    seal_coefficient, seal_flow, seal_upstream_state, state_ph,
};
use crate::section::{PointFirstSection, PointSecondSection, flow_or_zero};
use crate::speed_match::{guarantee_point, match_speed};

/// Relative mismatch between measured and balanced first-section discharge
/// flow above which a warning is logged.
const FLOW_BALANCE_TOL: f64 = 0.01;

/// Both sections of one back-to-back test point.
#[derive(Debug, Clone)]
pub struct BackToBackTest {
    pub first: PointFirstSection,
    pub second: PointSecondSection,
}

/// Both sections of one converted back-to-back test point.
#[derive(Debug, Clone)]
pub struct BackToBackPoint {
    pub first: ConvertedPoint,
    pub second: ConvertedPoint,
}

#[derive(Debug, Clone)]
struct RotorTestPair {
    first: Point,
    second: Point,
    k_end: Option<f64>,
    k_div: Option<f64>,
    seal_gas: SealGasSplit,
    bearing_loss: Option<Power>,
    equivalent_speed: (Option<AngularVelocity>, Option<AngularVelocity>),
}

/// Division-wall flow from the direct measurement or from the measured
/// first-section discharge flow.
fn division_wall_flow(first: &PointFirstSection, rotor_flow: f64) -> f64 {
    match (first.division_wall_flow, first.first_section_discharge_flow) {
        (Some(m_div), Some(m_1d)) => {
            let balanced = rotor_flow + m_div.value;
            if (balanced - m_1d.value).abs() > FLOW_BALANCE_TOL * m_1d.value {
                warn!(
                    measured = m_1d.value,
                    balanced, "first-section discharge flow does not balance"
                );
            }
            m_div.value
        }
        (Some(m_div), None) => m_div.value,
        (None, Some(m_1d)) => {
            let m_div = m_1d.value - rotor_flow;
            if m_div < 0.0 {
                warn!(
                    m_1d = m_1d.value,
                    rotor_flow, "first-section discharge flow below rotor flow; no division-wall leakage"
                );
            }
            m_div.max(0.0)
        }
        (None, None) => 0.0,
    }
}

fn rotor_test_pair(
    ctx: &PerfContext<'_>,
    config: &CorrectionConfig,
    test: &BackToBackTest,
    guarantee_suc: (&ThermoState, &ThermoState),
) -> CompressorResult<RotorTestPair> {
    let (f1, f2) = (&test.first.point, &test.second.point);
    let casing1 = casing_data(config, test.first.casing.as_ref())?;
    let casing2 = casing_data(config, test.second.casing.as_ref())?;
    let bearing_loss = bearing_loss(config, test.first.oil.as_ref())?;

    let seal_gas = if config.leakages {
        SealGasSplit::new(test.first.seal_gas.as_ref())
    } else {
        SealGasSplit::new(None)
    };

    let (end, m_end, supply_p, k_end) = if config.leakages {
        let upstream =
            seal_upstream_state(ctx.fluid, test.second.end_seal_upstream.as_ref(), f2.suc())?;
        let m_end = flow_or_zero(test.second.balance_line_flow);
        let end = end_stream(ctx.fluid, &upstream, m_end, &seal_gas)?;
        let k_end = match &end {
            Some(e) => Some(seal_coefficient(m_end, &e.state, f1.suc().p())?),
            None => None,
        };
        (end, m_end, upstream.p(), k_end)
    } else {
        (None, 0.0, f2.suc().p(), None)
    };

    let (suc1, m_r1) = mix_suction(
        ctx.fluid,
        f1.suc(),
        f1.flow_m().value,
        m_end,
        &seal_gas,
        supply_p,
    )?;

    let (m_div, div_up) = if config.leakages {
        let up = seal_upstream_state(
            ctx.fluid,
            test.second.division_wall_upstream.as_ref(),
            f2.disch(),
        )?;
        (division_wall_flow(&test.first, m_r1), Some(up))
    } else {
        (0.0, None)
    };
    let k_div = match &div_up {
        Some(up) if m_div > 0.0 => Some(seal_coefficient(m_div, up, f1.disch().p())?),
        _ => None,
    };

    // First-section rotor discharge recovered from the discharge mixing.
    let disch1 = match &div_up {
        Some(up) if m_div > 0.0 => {
            let m_1d = m_r1 + m_div;
            let h = (m_1d * f1.disch().h() - m_div * up.h()) / m_r1;
            state_ph(ctx.fluid, f1.disch(), f1.disch().p().value, h)?
        }
        _ => f1.disch().clone(),
    };
    let disch1 = rotor_discharge_test(ctx, &disch1, casing1, m_r1)?;
    let first = point_like(ctx, f1, suc1, disch1, m_r1)?;

    let m_r2 = f2.flow_m().value - end.as_ref().map_or(0.0, |e| e.balance_piston);
    let disch2 = rotor_discharge_test(ctx, f2.disch(), casing2, m_r2)?;
    let second = point_like(ctx, f2, f2.suc().clone(), disch2, m_r2)?;

    debug!(
        eff_first = first.eff(),
        eff_second = second.eff(),
        m_div,
        "back-to-back rotor test points"
    );

    Ok(RotorTestPair {
        first,
        second,
        k_end,
        k_div,
        seal_gas,
        bearing_loss,
        equivalent_speed: (
            equivalent_speed(ctx, f1, guarantee_suc.0),
            equivalent_speed(ctx, f2, guarantee_suc.1),
        ),
    })
}

fn to_specified(
    ctx: &PerfContext<'_>,
    config: &CorrectionConfig,
    test: &BackToBackTest,
    rt: &RotorTestPair,
    guarantee: (&Point, &Point),
    speed: AngularVelocity,
) -> CompressorResult<BackToBackPoint> {
    let options = convert_options(config, speed);
    let (g1, g2) = guarantee;
    let (g1s, g2s) = (g1.suc(), g2.suc());

    // Second section: suction is the guarantee second-section suction.
    let rotor2 = convert_from(ctx, &rt.second, g2s.clone(), &options)?;
    let end = match rt.k_end {
        Some(k_end) => predict_end_stream(ctx.fluid, k_end, g2s, g1s.p(), &rt.seal_gas)?,
        None => None,
    };
    let m_end = end.as_ref().map_or(0.0, |e| e.flow);
    let m_f2 = rotor2.flow_m().value + end.as_ref().map_or(0.0, |e| e.balance_piston);
    let casing2 = casing_data(config, test.second.casing.as_ref())?;
    let disch2 = flange_discharge_sp(ctx, &rotor2, casing2, &rt.second)?;
    let flange2 = point_like(ctx, &rotor2, g2s.clone(), disch2, m_f2)?;

    // First section: rotor suction from the mixing balance.
    let (rotor1, m_f1) = if rt.k_end.is_some() || rt.seal_gas.suction > 0.0 {
        let mut last: Option<(Point, f64)> = None;
        fixed_point(
            "first-section rotor suction temperature",
            g1s.t().value,
            &FixedPointConfig::default(),
            |t| {
                let suc = g1s.update(ctx.fluid, StateInput::PT { p: g1s.p(), t: k(t) })?;
                let rotor = convert_from(ctx, &rt.first, suc, &options)?;
                let m_f1 = rotor.flow_m().value - m_end - rt.seal_gas.suction;
                if m_f1 <= 0.0 {
                    return Err(CompressorError::InvalidArg {
                        what: "leakage exceeds the first-section rotor flow",
                    });
                }
                let (mixed, _) =
                    mix_suction(ctx.fluid, g1s, m_f1, m_end, &rt.seal_gas, g2s.p())?;
                last = Some((rotor, m_f1));
                Ok(mixed.t().value)
            },
        )?;
        last.ok_or(CompressorError::InvalidArg {
            what: "rotor suction iteration produced no point",
        })?
    } else {
        let rotor = convert_from(ctx, &rt.first, g1s.clone(), &options)?;
        let flow = rotor.flow_m().value;
        (rotor, flow)
    };

    // First-section flange discharge: rotor discharge less casing heat,
    // mixed with the division-wall leakage.
    let m_r1 = rotor1.flow_m().value;
    let q1 = match casing_data(config, test.first.casing.as_ref())? {
        Some(c) => casing_heat_loss_at(c, rt.first.disch().t(), rotor1.disch().t()).value,
        None => 0.0,
    };
    let m_div = match rt.k_div {
        Some(k_div) => seal_flow(k_div, rotor2.disch(), rotor1.disch().p())?,
        None => 0.0,
    };
    let h1 = (m_r1 * (rotor1.disch().h() - q1 / m_r1) + m_div * rotor2.disch().h()) / (m_r1 + m_div);
    let disch1 = state_ph(ctx.fluid, rotor1.disch(), rotor1.disch().p().value, h1)?;
    let flange1 = point_like(ctx, &rotor1, g1s.clone(), disch1, m_f1)?;

    let bearing_loss_sp = bearing_loss_at(rt.bearing_loss, test.first.point.speed(), speed);
    Ok(BackToBackPoint {
        first: ConvertedPoint {
            flange_test: test.first.point.clone(),
            rotor_test: rt.first.clone(),
            mach_deviation: mach_deviation(&rt.first, &rotor1),
            bearing_loss_sp,
            equivalent_speed: rt.equivalent_speed.0,
            ratios: GuaranteeRatios::new(&flange1, g1),
            rotor_sp: rotor1,
            flange_sp: flange1,
        },
        second: ConvertedPoint {
            flange_test: test.second.point.clone(),
            rotor_test: rt.second.clone(),
            mach_deviation: mach_deviation(&rt.second, &rotor2),
            bearing_loss_sp: None,
            equivalent_speed: rt.equivalent_speed.1,
            ratios: GuaranteeRatios::new(&flange2, g2),
            rotor_sp: rotor2,
            flange_sp: flange2,
        },
    })
}

/// Back-to-back compressor with one shared operating speed.
#[derive(Debug, Clone)]
pub struct BackToBack {
    guarantee_first: Point,
    guarantee_second: Point,
    test_points: Vec<BackToBackTest>,
    rotor_tests: Vec<RotorTestPair>,
    points: Vec<BackToBackPoint>,
    curve_first: Option<Curve>,
    curve_second: Option<Curve>,
    point_first_guarantee: Point,
    point_second_guarantee: Point,
    speed: AngularVelocity,
    config: CorrectionConfig,
    method: PolytropicMethod,
}

impl BackToBack {
    /// Convert every test point at `speed` (the first guarantee speed when
    /// `None`).
    pub fn new(
        ctx: &PerfContext<'_>,
        guarantee_first: Point,
        guarantee_second: Point,
        test_points: Vec<BackToBackTest>,
        config: CorrectionConfig,
        speed: Option<AngularVelocity>,
    ) -> CompressorResult<Self> {
        if test_points.is_empty() {
            return Err(CompressorError::InvalidArg {
                what: "at least one test point is required",
            });
        }
        let rotor_tests = test_points
            .par_iter()
            .map(|t| {
                rotor_test_pair(
                    ctx,
                    &config,
                    t,
                    (guarantee_first.suc(), guarantee_second.suc()),
                )
            })
            .collect::<CompressorResult<Vec<_>>>()?;
        let speed = speed.unwrap_or(guarantee_first.speed());
        Self::build(
            ctx,
            (guarantee_first, guarantee_second),
            test_points,
            rotor_tests,
            config,
            speed,
        )
    }

    fn build(
        ctx: &PerfContext<'_>,
        guarantee: (Point, Point),
        test_points: Vec<BackToBackTest>,
        rotor_tests: Vec<RotorTestPair>,
        config: CorrectionConfig,
        speed: AngularVelocity,
    ) -> CompressorResult<Self> {
        let (guarantee_first, guarantee_second) = guarantee;
        let points = test_points
            .par_iter()
            .zip(rotor_tests.par_iter())
            .map(|(t, rt)| {
                to_specified(
                    ctx,
                    &config,
                    t,
                    rt,
                    (&guarantee_first, &guarantee_second),
                    speed,
                )
            })
            .collect::<CompressorResult<Vec<_>>>()?;

        let firsts: Vec<ConvertedPoint> = points.iter().map(|p| p.first.clone()).collect();
        let seconds: Vec<ConvertedPoint> = points.iter().map(|p| p.second.clone()).collect();
        let (curve_first, point_first_guarantee) =
            guarantee_point(ctx, &firsts, &guarantee_first)?;
        let (curve_second, point_second_guarantee) =
            guarantee_point(ctx, &seconds, &guarantee_second)?;

        info!(
            points = points.len(),
            speed_rpm = to_rpm(speed),
            eff_first = point_first_guarantee.eff(),
            eff_second = point_second_guarantee.eff(),
            p_d = point_second_guarantee.disch().p().value,
            "back-to-back assembly built"
        );

        Ok(Self {
            guarantee_first,
            guarantee_second,
            test_points,
            rotor_tests,
            points,
            curve_first,
            curve_second,
            point_first_guarantee,
            point_second_guarantee,
            speed,
            config,
            method: ctx.method,
        })
    }

    /// Same test data converted at another operating speed.
    pub fn at_speed(&self, ctx: &PerfContext<'_>, speed: AngularVelocity) -> CompressorResult<Self> {
        Self::build(
            ctx,
            (self.guarantee_first.clone(), self.guarantee_second.clone()),
            self.test_points.clone(),
            self.rotor_tests.clone(),
            self.config,
            speed,
        )
    }

    /// Assembly at the speed where the second-section discharge pressure at
    /// guarantee flow equals its guarantee discharge pressure.
    pub fn calculate_speed_to_match_discharge_pressure(
        &self,
        ctx: &PerfContext<'_>,
    ) -> CompressorResult<Self> {
        let speed = match_speed(
            self.speed,
            self.guarantee_second.suc().p().value,
            self.guarantee_second.disch().p().value,
            |w| {
                Ok(self
                    .at_speed(ctx, rad_per_s(w))?
                    .point_second_guarantee
                    .disch()
                    .p()
                    .value)
            },
        )?;
        self.at_speed(ctx, speed)
    }

    pub fn guarantee_first(&self) -> &Point {
        &self.guarantee_first
    }

    pub fn guarantee_second(&self) -> &Point {
        &self.guarantee_second
    }

    pub fn test_points(&self) -> &[BackToBackTest] {
        &self.test_points
    }

    pub fn points(&self) -> &[BackToBackPoint] {
        &self.points
    }

    pub fn curve_first(&self) -> Option<&Curve> {
        self.curve_first.as_ref()
    }

    pub fn curve_second(&self) -> Option<&Curve> {
        self.curve_second.as_ref()
    }

    pub fn point_first_guarantee(&self) -> &Point {
        &self.point_first_guarantee
    }

    pub fn point_second_guarantee(&self) -> &Point {
        &self.point_second_guarantee
    }

    pub fn speed(&self) -> AngularVelocity {
        self.speed
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    pub fn method(&self) -> PolytropicMethod {
        self.method
    }

    pub fn ratios_first(&self) -> GuaranteeRatios {
        GuaranteeRatios::new(&self.point_first_guarantee, &self.guarantee_first)
    }

    pub fn ratios_second(&self) -> GuaranteeRatios {
        GuaranteeRatios::new(&self.point_second_guarantee, &self.guarantee_second)
    }

    /// Combined gas power over combined guarantee gas power.
    pub fn power_ratio(&self) -> f64 {
        (self.point_first_guarantee.power().value + self.point_second_guarantee.power().value)
            / (self.guarantee_first.power().value + self.guarantee_second.power().value)
    }

    pub fn mechanical_losses(&self) -> Power {
        mean_loss(self.points.iter().map(|p| &p.first))
    }

    /// Gas power of both sections at guarantee flow plus mechanical losses.
    pub fn shaft_power(&self) -> Power {
        watts(
            self.point_first_guarantee.power().value
                + self.point_second_guarantee.power().value
                + self.mechanical_losses().value,
        )
    }
}
