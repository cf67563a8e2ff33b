//! Guarantee-flow point and the outer speed iteration.

use cc_core::numeric::rel_diff;
use cc_core::units::{AngularVelocity, rad_per_s, to_rpm};
use cc_point::{Curve, PerfContext, Point};
use cc_solver::{NewtonConfig, newton_scalar};
use tracing::{info, warn};

use crate::conversion::ConvertedPoint;
use crate::error::{CompressorError, CompressorResult};

/// Curve through the flange points at specified conditions and the point on
/// it at the guarantee volume flow. A single test point is used as is.
pub(crate) fn guarantee_point(
    ctx: &PerfContext<'_>,
    points: &[ConvertedPoint],
    guarantee: &Point,
) -> CompressorResult<(Option<Curve>, Point)> {
    if let [only] = points {
        return Ok((None, only.flange_sp.clone()));
    }
    let curve = Curve::new(points.iter().map(|p| p.flange_sp.clone()).collect())?;
    let q = guarantee.flow_v();
    let (lo, hi) = curve.flow_range();
    if q < lo || q > hi {
        warn!(
            flow = q.value,
            min = lo.value,
            max = hi.value,
            "guarantee flow outside the converted test range"
        );
    }
    let point = curve.point_at(ctx, q)?;
    Ok((Some(curve), point))
}

/// Newton over shaft speed [rad/s] until `disch_p(speed)` equals
/// `target` [Pa].
pub(crate) fn match_speed<F>(
    speed: AngularVelocity,
    p_suc: f64,
    target: f64,
    mut disch_p: F,
) -> CompressorResult<AngularVelocity>
where
    F: FnMut(f64) -> CompressorResult<f64>,
{
    if target.is_nan() || target <= p_suc {
        return Err(CompressorError::InvalidArg {
            what: "guarantee discharge pressure must exceed suction pressure",
        });
    }
    let w = speed.value;
    let p0 = disch_p(w)?;
    // Pressure-ratio logarithm grows roughly with speed squared.
    let w0 = if p0 > p_suc {
        w * ((target / p_suc).ln() / (p0 / p_suc).ln()).sqrt()
    } else {
        w
    };

    let config = NewtonConfig {
        step_tol: 1e-4,
        residual_tol: 1e-9,
        fd_rel_step: 1e-5,
        ..NewtonConfig::default()
    };
    let root = newton_scalar("speed to match discharge pressure", w0, &config, |w| {
        Ok::<_, CompressorError>(rel_diff(disch_p(w)?, target))
    })?;
    info!(
        speed_rpm = to_rpm(rad_per_s(root.x)),
        iterations = root.iterations,
        residual = root.residual,
        "speed matched to guarantee discharge pressure"
    );
    Ok(rad_per_s(root.x))
}
