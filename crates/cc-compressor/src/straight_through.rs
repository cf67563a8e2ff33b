//! Single-section (straight-through) compressor assembly.

use cc_core::units::{AngularVelocity, Power, k, rad_per_s, to_rpm, watts};
use cc_fluids::{StateInput, ThermoState};
use cc_point::{Curve, PerfContext, Point, PolytropicMethod, convert_from, mach_deviation};
use cc_solver::{FixedPointConfig, fixed_point};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::CorrectionConfig;
use crate::conversion::{
    ConvertedPoint, GuaranteeRatios, bearing_loss, bearing_loss_at, casing_data,
    convert_options, equivalent_speed, flange_discharge_sp, mean_loss, point_like,
    rotor_discharge_test,
};
use crate::error::{CompressorError, CompressorResult};
use crate::leakage::{
    SealGasSplit, end_stream, mix_suction, predict_end_stream, seal_coefficient,
    seal_upstream_state,
};
use crate::section::{Point1Sec, flow_or_zero};
use crate::speed_match::{guarantee_point, match_speed};

/// Test-side results that do not depend on the operating speed.
#[derive(Debug, Clone)]
struct RotorTest {
    rotor: Point,
    k_seal: Option<f64>,
    seal_gas: SealGasSplit,
    bearing_loss: Option<Power>,
    equivalent_speed: Option<AngularVelocity>,
}

impl RotorTest {
    fn leakage_active(&self) -> bool {
        self.k_seal.is_some() || self.seal_gas.suction > 0.0
    }
}

/// Flange test point to rotor test point.
fn rotor_test(
    ctx: &PerfContext<'_>,
    config: &CorrectionConfig,
    test: &Point1Sec,
    guarantee_suc: &ThermoState,
) -> CompressorResult<RotorTest> {
    let flange = &test.point;
    let casing = casing_data(config, test.casing.as_ref())?;
    let bearing_loss = bearing_loss(config, test.oil.as_ref())?;

    let (seal_gas, m_end, supply_p, k_seal) = if config.leakages {
        let seal_gas = SealGasSplit::new(test.seal_gas.as_ref());
        let upstream =
            seal_upstream_state(ctx.fluid, test.end_seal_upstream.as_ref(), flange.disch())?;
        let m_end = flow_or_zero(test.balance_line_flow);
        let k_seal = match end_stream(ctx.fluid, &upstream, m_end, &seal_gas)? {
            Some(end) => Some(seal_coefficient(m_end, &end.state, flange.suc().p())?),
            None => None,
        };
        (seal_gas, m_end, upstream.p(), k_seal)
    } else {
        (SealGasSplit::new(None), 0.0, flange.disch().p(), None)
    };

    let (suc, flow) = mix_suction(
        ctx.fluid,
        flange.suc(),
        flange.flow_m().value,
        m_end,
        &seal_gas,
        supply_p,
    )?;
    let disch = rotor_discharge_test(ctx, flange.disch(), casing, flow)?;
    let rotor = point_like(ctx, flange, suc, disch, flow)?;
    debug!(
        flange_eff = flange.eff(),
        rotor_eff = rotor.eff(),
        rotor_flow = flow,
        "rotor test point"
    );

    Ok(RotorTest {
        rotor,
        k_seal,
        seal_gas,
        bearing_loss,
        equivalent_speed: equivalent_speed(ctx, flange, guarantee_suc),
    })
}

/// Rotor test point to rotor and flange points at guarantee suction and
/// `speed`.
fn to_specified(
    ctx: &PerfContext<'_>,
    config: &CorrectionConfig,
    test: &Point1Sec,
    rt: &RotorTest,
    guarantee: &Point,
    speed: AngularVelocity,
) -> CompressorResult<ConvertedPoint> {
    let options = convert_options(config, speed);
    let guarantee_suc = guarantee.suc();

    let (rotor_sp, flange_flow) = if rt.leakage_active() {
        let mut last: Option<(Point, f64)> = None;
        fixed_point(
            "rotor suction temperature",
            guarantee_suc.t().value,
            &FixedPointConfig::default(),
            |t| {
                let suc = guarantee_suc.update(
                    ctx.fluid,
                    StateInput::PT {
                        p: guarantee_suc.p(),
                        t: k(t),
                    },
                )?;
                let rotor = convert_from(ctx, &rt.rotor, suc, &options)?;
                let m_end = match rt.k_seal {
                    Some(k_seal) => predict_end_stream(
                        ctx.fluid,
                        k_seal,
                        rotor.disch(),
                        guarantee_suc.p(),
                        &rt.seal_gas,
                    )?
                    .map_or(0.0, |e| e.flow),
                    None => 0.0,
                };
                let flange_flow = rotor.flow_m().value - m_end - rt.seal_gas.suction;
                if flange_flow <= 0.0 {
                    return Err(CompressorError::InvalidArg {
                        what: "leakage exceeds the rotor flow",
                    });
                }
                let (mixed, _) = mix_suction(
                    ctx.fluid,
                    guarantee_suc,
                    flange_flow,
                    m_end,
                    &rt.seal_gas,
                    rotor.disch().p(),
                )?;
                last = Some((rotor, flange_flow));
                Ok(mixed.t().value)
            },
        )?;
        last.ok_or(CompressorError::InvalidArg {
            what: "rotor suction iteration produced no point",
        })?
    } else {
        let rotor = convert_from(ctx, &rt.rotor, guarantee_suc.clone(), &options)?;
        let flow = rotor.flow_m().value;
        (rotor, flow)
    };

    let casing = casing_data(config, test.casing.as_ref())?;
    let disch = flange_discharge_sp(ctx, &rotor_sp, casing, &rt.rotor)?;
    let flange_sp = point_like(ctx, &rotor_sp, guarantee_suc.clone(), disch, flange_flow)?;

    Ok(ConvertedPoint {
        flange_test: test.point.clone(),
        rotor_test: rt.rotor.clone(),
        mach_deviation: mach_deviation(&rt.rotor, &rotor_sp),
        bearing_loss_sp: bearing_loss_at(rt.bearing_loss, test.point.speed(), speed),
        equivalent_speed: rt.equivalent_speed,
        ratios: GuaranteeRatios::new(&flange_sp, guarantee),
        rotor_sp,
        flange_sp,
    })
}

/// One test point converted on its own to the suction of `guarantee` at
/// `speed`, outside any assembly.
pub fn convert_test_point(
    ctx: &PerfContext<'_>,
    config: &CorrectionConfig,
    test: &Point1Sec,
    guarantee: &Point,
    speed: AngularVelocity,
) -> CompressorResult<ConvertedPoint> {
    let rt = rotor_test(ctx, config, test, guarantee.suc())?;
    to_specified(ctx, config, test, &rt, guarantee, speed)
}

/// Single-section compressor: guarantee point, test points and their
/// conversion to the guarantee suction at the operating speed.
#[derive(Debug, Clone)]
pub struct StraightThrough {
    guarantee: Point,
    test_points: Vec<Point1Sec>,
    rotor_tests: Vec<RotorTest>,
    points: Vec<ConvertedPoint>,
    curve: Option<Curve>,
    point_guarantee: Point,
    speed: AngularVelocity,
    config: CorrectionConfig,
    method: PolytropicMethod,
}

impl StraightThrough {
    /// Convert every test point at `speed` (the guarantee speed when `None`).
    pub fn new(
        ctx: &PerfContext<'_>,
        guarantee: Point,
        test_points: Vec<Point1Sec>,
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
            .map(|t| rotor_test(ctx, &config, t, guarantee.suc()))
            .collect::<CompressorResult<Vec<_>>>()?;
        let speed = speed.unwrap_or(guarantee.speed());
        Self::build(ctx, guarantee, test_points, rotor_tests, config, speed)
    }

    fn build(
        ctx: &PerfContext<'_>,
        guarantee: Point,
        test_points: Vec<Point1Sec>,
        rotor_tests: Vec<RotorTest>,
        config: CorrectionConfig,
        speed: AngularVelocity,
    ) -> CompressorResult<Self> {
        let points = test_points
            .par_iter()
            .zip(rotor_tests.par_iter())
            .map(|(t, rt)| to_specified(ctx, &config, t, rt, &guarantee, speed))
            .collect::<CompressorResult<Vec<_>>>()?;

        let (curve, point_guarantee) = guarantee_point(ctx, &points, &guarantee)?;
        info!(
            points = points.len(),
            speed_rpm = to_rpm(speed),
            eff = point_guarantee.eff(),
            p_d = point_guarantee.disch().p().value,
            "straight-through assembly built"
        );

        Ok(Self {
            guarantee,
            test_points,
            rotor_tests,
            points,
            curve,
            point_guarantee,
            speed,
            config,
            method: ctx.method,
        })
    }

    /// Same test data converted at another operating speed.
    pub fn at_speed(&self, ctx: &PerfContext<'_>, speed: AngularVelocity) -> CompressorResult<Self> {
        Self::build(
            ctx,
            self.guarantee.clone(),
            self.test_points.clone(),
            self.rotor_tests.clone(),
            self.config,
            speed,
        )
    }

    /// Assembly at the speed where the guarantee-flow discharge pressure
    /// equals the guarantee discharge pressure.
    pub fn calculate_speed_to_match_discharge_pressure(
        &self,
        ctx: &PerfContext<'_>,
    ) -> CompressorResult<Self> {
        let speed = match_speed(
            self.speed,
            self.guarantee.suc().p().value,
            self.guarantee.disch().p().value,
            |w| Ok(self.at_speed(ctx, rad_per_s(w))?.point_guarantee.disch().p().value),
        )?;
        self.at_speed(ctx, speed)
    }

    pub fn guarantee(&self) -> &Point {
        &self.guarantee
    }

    pub fn test_points(&self) -> &[Point1Sec] {
        &self.test_points
    }

    pub fn points(&self) -> &[ConvertedPoint] {
        &self.points
    }

    /// Curve of flange points at specified conditions (two or more test points).
    pub fn curve(&self) -> Option<&Curve> {
        self.curve.as_ref()
    }

    /// Flange point at specified conditions and guarantee flow.
    pub fn point_guarantee(&self) -> &Point {
        &self.point_guarantee
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

    pub fn ratios(&self) -> GuaranteeRatios {
        GuaranteeRatios::new(&self.point_guarantee, &self.guarantee)
    }

    /// Bearing losses at the operating speed (zero when not enabled).
    pub fn mechanical_losses(&self) -> Power {
        mean_loss(&self.points)
    }

    /// Gas power at the guarantee flow plus mechanical losses.
    pub fn shaft_power(&self) -> Power {
        watts(self.point_guarantee.power().value + self.mechanical_losses().value)
    }
}
