//! Example scenario on the CoolProp multi-fluid backend.
//!
//! The reference efficiency comes from a multi-fluid equation of state, so
//! only this backend is held to it closely.

use cc_core::units::{bar, k, kgps, mm, rpm};
use cc_fluids::{Composition, CoolPropModel, FluidModel, StateInput, ThermoState};
use cc_point::{
    ConvertOptions, Flow, Geometry, PerfContext, Point, PointInput, PolytropicMethod,
    convert_from,
};

fn test_gas() -> Composition {
    Composition::from_names(&[
        ("CO2", 0.80218),
        ("R134a", 0.18842),
        ("N2", 0.0091),
        ("O2", 0.0003),
    ])
    .unwrap()
}

fn state(model: &CoolPropModel, p_bar: f64, t: f64) -> ThermoState {
    model
        .state(
            StateInput::PT {
                p: bar(p_bar),
                t: k(t),
            },
            test_gas(),
        )
        .unwrap()
}

fn example_point(ctx: &PerfContext<'_>, model: &CoolPropModel) -> Point {
    Point::new(
        ctx,
        PointInput::DischSuc {
            suc: state(model, 1.826, 296.7),
            disch: state(model, 6.142, 392.1),
        },
        Flow::Mass(kgps(7.737)),
        rpm(7894.0),
        Geometry::new(mm(28.5), mm(365.0)),
    )
    .unwrap()
}

#[test]
fn example_scenario_matches_reference_efficiency() {
    let model = CoolPropModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let point = example_point(&ctx, &model);

    assert!(
        (point.eff() - 0.735723).abs() < 1e-3,
        "eff = {}",
        point.eff()
    );
    assert!((point.pressure_ratio() - 6.142 / 1.826).abs() < 1e-9);
}

#[test]
fn example_converted_to_its_own_suction_is_unchanged() {
    let model = CoolPropModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let point = example_point(&ctx, &model);

    let converted = convert_from(
        &ctx,
        &point,
        point.suc().clone(),
        &ConvertOptions::default(),
    )
    .unwrap();
    assert!((converted.eff() - point.eff()).abs() < 1e-6);
    assert!((converted.disch().p().value / point.disch().p().value - 1.0).abs() < 1e-4);
}
