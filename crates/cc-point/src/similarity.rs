//! Similarity conversion of a test point to new suction conditions.
//!
//! The flow and head coefficients of the original point are held fixed and
//! the efficiency is carried over, optionally with the Reynolds correction.
//! Either the speed is given and the volume ratio follows, or the speed is
//! searched so the volume ratio matches the original one.

use std::f64::consts::PI;

use crate::error::{PerfError, PerfResult};
use crate::point::{Flow, Geometry, PerfContext, Point, PointInput};
use crate::reynolds::{
    REYNOLDS_RATIO_BAND, ReynoldsCondition, ReynoldsCorrection, corrected_efficiency,
    mach_deviation_limits,
};
use cc_core::units::{AngularVelocity, kgpm3, m3ps, rad_per_s};
use cc_fluids::{StateInput, ThermoState};
use cc_solver::{NewtonConfig, newton_scalar};
use tracing::{debug, warn};

/// Quantity solved for during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Find {
    /// Speed given (or kept); volume ratio follows.
    #[default]
    VolumeRatio,
    /// Speed searched so the volume ratio equals the original.
    Speed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub find: Find,
    /// Target speed for [`Find::VolumeRatio`]; original speed when unset.
    pub speed: Option<AngularVelocity>,
    /// Target geometry; original geometry when unset.
    pub geometry: Option<Geometry>,
    pub reynolds: ReynoldsCorrection,
}

/// Convert `original` to suction state `suc`.
pub fn convert_from(
    ctx: &PerfContext<'_>,
    original: &Point,
    suc: ThermoState,
    options: &ConvertOptions,
) -> PerfResult<Point> {
    let geometry = options.geometry.unwrap_or(*original.geometry());

    let point = match options.find {
        Find::VolumeRatio => {
            let speed = options.speed.unwrap_or(original.speed());
            similar_at_speed(ctx, original, &suc, speed, geometry, original.eff())?
        }
        Find::Speed => {
            let speed = find_speed(ctx, original, &suc, geometry)?;
            similar_at_speed(ctx, original, &suc, speed, geometry, original.eff())?
        }
    };

    let point = match options.reynolds {
        ReynoldsCorrection::None => point,
        ReynoldsCorrection::Ptc1997 => reynolds_corrected(ctx, original, point)?,
    };

    check_similarity(original, &point);
    Ok(point)
}

/// `mach_test - mach_converted`.
pub fn mach_deviation(test: &Point, converted: &Point) -> f64 {
    test.mach() - converted.mach()
}

/// Point with the original phi and psi at `speed`, built at efficiency `eff`.
fn similar_at_speed(
    ctx: &PerfContext<'_>,
    original: &Point,
    suc: &ThermoState,
    speed: AngularVelocity,
    geometry: Geometry,
    eff: f64,
) -> PerfResult<Point> {
    let d = geometry.d.value;
    let u = speed.value * d / 2.0;
    let flow_v = original.phi() * PI * d * d / 4.0 * u;
    let head = original.psi() * u * u / 2.0;

    Point::new(
        ctx,
        PointInput::EffHeadSuc {
            suc: suc.clone(),
            eff,
            head,
        },
        Flow::Volume(m3ps(flow_v)),
        speed,
        geometry,
    )
}

fn isentropic_head_at_density(
    ctx: &PerfContext<'_>,
    suc: &ThermoState,
    volume_ratio: f64,
) -> PerfResult<f64> {
    let iso = suc.update(
        ctx.fluid,
        StateInput::DS {
            rho: kgpm3(suc.rho().value * volume_ratio),
            s: suc.s(),
        },
    )?;
    Ok(iso.h() - suc.h())
}

fn find_speed(
    ctx: &PerfContext<'_>,
    original: &Point,
    suc: &ThermoState,
    geometry: Geometry,
) -> PerfResult<AngularVelocity> {
    let target = original.volume_ratio();

    // Equal isentropic head at equal volume ratio fixes the tip speed.
    let head_orig = isentropic_head_at_density(ctx, original.suc(), target)?;
    let head_new = isentropic_head_at_density(ctx, suc, target)?;
    let w0 = original.speed().value * (head_new / head_orig).sqrt() * original.geometry().d.value
        / geometry.d.value;

    let config = NewtonConfig {
        step_tol: 1e-6,
        residual_tol: 1e-10,
        ..ctx.newton
    };
    // The outer slope is a finite difference over inner closures.
    let inner = ctx.with_newton(NewtonConfig {
        step_tol: 1e-3,
        ..ctx.newton
    });
    let root = newton_scalar("similarity speed", w0, &config, |w| {
        let point =
            similar_at_speed(&inner, original, suc, rad_per_s(w), geometry, original.eff())?;
        Ok::<_, PerfError>((point.volume_ratio() - target) / target)
    })?;
    debug!(
        speed = root.x,
        seed = w0,
        iterations = root.iterations,
        "similarity speed found"
    );
    Ok(rad_per_s(root.x))
}

fn reynolds_condition(point: &Point) -> ReynoldsCondition {
    ReynoldsCondition {
        reynolds: point.reynolds(),
        b: point.geometry().b,
        roughness: point.geometry().surface_roughness,
    }
}

/// Rebuild `converted` with the Reynolds-corrected efficiency; psi scales
/// with the efficiency ratio.
fn reynolds_corrected(
    ctx: &PerfContext<'_>,
    original: &Point,
    converted: Point,
) -> PerfResult<Point> {
    let test = reynolds_condition(original);
    let specified = reynolds_condition(&converted);
    let eff = corrected_efficiency(original.eff(), &test, &specified);

    let ratio = specified.reynolds / test.reynolds;
    if ratio < REYNOLDS_RATIO_BAND.0 || ratio > REYNOLDS_RATIO_BAND.1 {
        warn!(
            re_test = test.reynolds,
            re_specified = specified.reynolds,
            "Reynolds ratio {ratio:.3} outside {:?}",
            REYNOLDS_RATIO_BAND
        );
    }
    debug!(eff_test = original.eff(), eff, "Reynolds-corrected efficiency");

    let head = converted.head() * eff / original.eff();
    Point::new(
        ctx,
        PointInput::EffHeadSuc {
            suc: converted.suc().clone(),
            eff,
            head,
        },
        Flow::Volume(converted.flow_v()),
        converted.speed(),
        *converted.geometry(),
    )
}

fn check_similarity(original: &Point, converted: &Point) {
    let deviation = mach_deviation(original, converted);
    let (lower, upper) = mach_deviation_limits(converted.mach());
    if deviation < lower || deviation > upper {
        warn!(
            mach_test = original.mach(),
            mach_converted = converted.mach(),
            "Mach deviation {deviation:.4} outside [{lower:.4}, {upper:.4}]"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polytropic::PolytropicMethod;
    use cc_core::units::{bar, k, kgps, mm, rpm};
    use cc_fluids::{Composition, FluidModel, PengRobinsonModel, Species};

    fn state(model: &PengRobinsonModel, p_bar: f64, t: f64) -> ThermoState {
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

    fn test_point(ctx: &PerfContext<'_>, model: &PengRobinsonModel) -> Point {
        Point::new(
            ctx,
            PointInput::DischSuc {
                suc: state(model, 1.0, 300.0),
                disch: state(model, 3.0, 440.0),
            },
            Flow::Mass(kgps(2.0)),
            rpm(12_000.0),
            Geometry::new(mm(20.0), mm(300.0)),
        )
        .unwrap()
    }

    #[test]
    fn converting_to_same_conditions_is_identity() {
        let model = PengRobinsonModel::new();
        let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
        let original = test_point(&ctx, &model);
        let converted = convert_from(
            &ctx,
            &original,
            original.suc().clone(),
            &ConvertOptions::default(),
        )
        .unwrap();

        assert!((converted.disch().p().value / original.disch().p().value - 1.0).abs() < 1e-6);
        assert!((converted.disch().t().value - original.disch().t().value).abs() < 1e-3);
        assert!((converted.flow_m().value - 2.0).abs() < 1e-9);
        assert!((converted.eff() - original.eff()).abs() < 1e-9);
    }

    #[test]
    fn conversion_keeps_coefficients() {
        let model = PengRobinsonModel::new();
        let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
        let original = test_point(&ctx, &model);
        let options = ConvertOptions {
            speed: Some(rpm(11_000.0)),
            ..ConvertOptions::default()
        };
        let converted =
            convert_from(&ctx, &original, state(&model, 2.0, 310.0), &options).unwrap();

        assert!((converted.phi() / original.phi() - 1.0).abs() < 1e-9);
        assert!((converted.psi() / original.psi() - 1.0).abs() < 1e-6);
        assert!((converted.eff() - original.eff()).abs() < 1e-6);
    }

    #[test]
    fn find_speed_matches_volume_ratio() {
        let model = PengRobinsonModel::new();
        let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
        let original = test_point(&ctx, &model);
        let options = ConvertOptions {
            find: Find::Speed,
            ..ConvertOptions::default()
        };
        let converted =
            convert_from(&ctx, &original, state(&model, 1.0, 330.0), &options).unwrap();

        assert!((converted.volume_ratio() / original.volume_ratio() - 1.0).abs() < 1e-6);
        // Hotter suction needs a faster machine for the same volume ratio.
        assert!(converted.speed() > original.speed());
        assert!(mach_deviation(&original, &converted).abs() < 0.02);
    }

    #[test]
    fn reynolds_correction_raises_efficiency_at_higher_reynolds() {
        let model = PengRobinsonModel::new();
        let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
        let original = test_point(&ctx, &model);
        let options = ConvertOptions {
            reynolds: ReynoldsCorrection::Ptc1997,
            ..ConvertOptions::default()
        };
        let converted =
            convert_from(&ctx, &original, state(&model, 4.0, 300.0), &options).unwrap();

        assert!(converted.reynolds() > original.reynolds());
        assert!(converted.eff() > original.eff());
        let psi_ratio = converted.psi() / original.psi();
        let eff_ratio = converted.eff() / original.eff();
        assert!((psi_ratio - eff_ratio).abs() < 1e-6);
    }
}
