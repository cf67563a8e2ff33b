//! Pieces shared by both assembly kinds: per-point results, guarantee
//! ratios and the correction inputs pulled from auxiliary measurements.

use cc_core::units::{AngularVelocity, Power, kgps, watts};
use cc_fluids::ThermoState;
use cc_point::{
    ConvertOptions, Find, Flow, PerfContext, Point, PointInput, ReynoldsCorrection, convert_from,
};
use tracing::warn;

use crate::bearing::{BearingOil, scale_loss};
use crate::config::CorrectionConfig;
use crate::error::{CompressorError, CompressorResult};
use crate::leakage::{casing_heat_loss, casing_heat_loss_at, shift_enthalpy};
use crate::section::CasingHeat;

/// Specified-to-guarantee ratios of one converted point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuaranteeRatios {
    pub head: f64,
    pub flow: f64,
    pub power: f64,
    pub disch_p: f64,
}

impl GuaranteeRatios {
    pub fn new(point: &Point, guarantee: &Point) -> Self {
        Self {
            head: point.head() / guarantee.head(),
            flow: point.flow_v().value / guarantee.flow_v().value,
            power: point.power().value / guarantee.power().value,
            disch_p: point.disch().p().value / guarantee.disch().p().value,
        }
    }
}

/// One test point carried from flange test conditions to flange specified
/// conditions.
#[derive(Debug, Clone)]
pub struct ConvertedPoint {
    pub flange_test: Point,
    pub rotor_test: Point,
    pub rotor_sp: Point,
    pub flange_sp: Point,
    /// Mechanical losses at the specified speed, when enabled
    pub bearing_loss_sp: Option<Power>,
    /// `mach_test - mach_specified` on the rotor points
    pub mach_deviation: f64,
    /// Speed reproducing the test volume ratio at guarantee suction
    pub equivalent_speed: Option<AngularVelocity>,
    pub ratios: GuaranteeRatios,
}

pub(crate) fn convert_options(
    config: &CorrectionConfig,
    speed: AngularVelocity,
) -> ConvertOptions {
    ConvertOptions {
        find: Find::VolumeRatio,
        speed: Some(speed),
        geometry: None,
        reynolds: config.reynolds,
    }
}

/// Casing data when the correction is enabled.
pub(crate) fn casing_data<'a>(
    config: &CorrectionConfig,
    casing: Option<&'a CasingHeat>,
) -> CompressorResult<Option<&'a CasingHeat>> {
    if !config.casing_heat_loss {
        return Ok(None);
    }
    casing
        .map(Some)
        .ok_or(CompressorError::MissingAuxiliaryData {
            what: "casing area and temperatures",
        })
}

/// Bearing loss at test when the correction is enabled.
pub(crate) fn bearing_loss(
    config: &CorrectionConfig,
    oil: Option<&BearingOil>,
) -> CompressorResult<Option<Power>> {
    if !config.bearing_mechanical_losses {
        return Ok(None);
    }
    let oil = oil.ok_or(CompressorError::MissingAuxiliaryData {
        what: "bearing oil data",
    })?;
    Ok(Some(oil.loss()?))
}

pub(crate) fn bearing_loss_at(
    loss: Option<Power>,
    speed_test: AngularVelocity,
    speed: AngularVelocity,
) -> Option<Power> {
    loss.map(|l| scale_loss(l, speed_test, speed))
}

/// Rotor discharge at test: flange discharge plus the casing heat spread
/// over the rotor flow.
pub(crate) fn rotor_discharge_test(
    ctx: &PerfContext<'_>,
    flange_disch: &ThermoState,
    casing: Option<&CasingHeat>,
    rotor_flow: f64,
) -> CompressorResult<ThermoState> {
    match casing {
        Some(c) => shift_enthalpy(
            ctx.fluid,
            flange_disch,
            casing_heat_loss(c).value / rotor_flow,
        ),
        None => Ok(flange_disch.clone()),
    }
}

/// Flange discharge at specified conditions: rotor discharge minus the
/// casing heat at the specified rotor discharge temperature.
pub(crate) fn flange_discharge_sp(
    ctx: &PerfContext<'_>,
    rotor_sp: &Point,
    casing: Option<&CasingHeat>,
    rotor_test: &Point,
) -> CompressorResult<ThermoState> {
    match casing {
        Some(c) => {
            let q = casing_heat_loss_at(c, rotor_test.disch().t(), rotor_sp.disch().t());
            shift_enthalpy(
                ctx.fluid,
                rotor_sp.disch(),
                -q.value / rotor_sp.flow_m().value,
            )
        }
        None => Ok(rotor_sp.disch().clone()),
    }
}

/// Closed point at the same speed and geometry as `like`.
pub(crate) fn point_like(
    ctx: &PerfContext<'_>,
    like: &Point,
    suc: ThermoState,
    disch: ThermoState,
    flow: f64,
) -> CompressorResult<Point> {
    if !(flow.is_finite() && flow > 0.0) {
        return Err(CompressorError::InvalidArg {
            what: "leakage exceeds the measured flow",
        });
    }
    Ok(Point::new(
        ctx,
        PointInput::DischSuc { suc, disch },
        Flow::Mass(kgps(flow)),
        like.speed(),
        *like.geometry(),
    )?)
}

/// Speed at which the flange test point reproduces its volume ratio at
/// guarantee suction. Failures are logged and reported as `None`.
pub(crate) fn equivalent_speed(
    ctx: &PerfContext<'_>,
    flange_test: &Point,
    guarantee_suc: &ThermoState,
) -> Option<AngularVelocity> {
    let options = ConvertOptions {
        find: Find::Speed,
        reynolds: ReynoldsCorrection::None,
        ..ConvertOptions::default()
    };
    match convert_from(ctx, flange_test, guarantee_suc.clone(), &options) {
        Ok(p) => Some(p.speed()),
        Err(e) => {
            warn!(error = %e, "equivalent speed not found");
            None
        }
    }
}

/// Average specified-speed mechanical loss over the converted points.
pub(crate) fn mean_loss<'a>(points: impl IntoIterator<Item = &'a ConvertedPoint>) -> Power {
    let losses: Vec<f64> = points
        .into_iter()
        .filter_map(|p| p.bearing_loss_sp.map(|l| l.value))
        .collect();
    if losses.is_empty() {
        watts(0.0)
    } else {
        watts(losses.iter().sum::<f64>() / losses.len() as f64)
    }
}
