//! CoolProp integration tests.
//!
//! Broad tolerances keep these independent of the CoolProp version while still
//! checking physical plausibility.

use cc_core::units::{bar, k, pa};
use cc_fluids::{Composition, CoolPropModel, FluidModel, Species, StateInput};

#[test]
fn nitrogen_gas_density_trend() {
    let model = CoolPropModel::new();
    let comp = Composition::pure(Species::N2);
    let t = k(300.0);

    let rho: Vec<f64> = [1e5, 2e5, 5e5]
        .into_iter()
        .map(|p| {
            model
                .state(StateInput::PT { p: pa(p), t }, comp.clone())
                .unwrap()
                .rho()
                .value
        })
        .collect();

    assert!(rho[0] < rho[1] && rho[1] < rho[2]);
    let ratio = rho[1] / rho[0];
    assert!(ratio > 1.8 && ratio < 2.2, "density ratio = {}", ratio);
}

#[test]
fn co2_properties_are_plausible() {
    let model = CoolPropModel::new();
    let st = model
        .state(
            StateInput::PT {
                p: bar(10.0),
                t: k(300.0),
            },
            Composition::pure(Species::CO2),
        )
        .unwrap();

    assert!((st.rho().value - 18.6).abs() < 0.5, "rho = {}", st.rho().value);
    assert!(st.gamma() > 1.2 && st.gamma() < 1.5, "gamma = {}", st.gamma());
    assert!(st.viscosity().value > 1e-5 && st.viscosity().value < 2e-5);
    assert!((st.compressibility_factor() - 0.95).abs() < 0.03);
}

#[test]
fn ph_round_trip() {
    let model = CoolPropModel::new();
    let comp = Composition::pure(Species::O2);
    let p = pa(500_000.0);

    let state_pt = model
        .state(StateInput::PT { p, t: k(350.0) }, comp.clone())
        .unwrap();
    let state_ph = model
        .state(StateInput::PH { p, h: state_pt.h() }, comp)
        .unwrap();

    let t_diff = (state_ph.t().value - 350.0).abs();
    assert!(t_diff < 1e-3, "Temperature round-trip error: {} K", t_diff);
}

#[test]
fn hydrogen_low_molecular_weight() {
    let model = CoolPropModel::new();
    let st = model
        .state(
            StateInput::PT {
                p: pa(101325.0),
                t: k(300.0),
            },
            Composition::pure(Species::H2),
        )
        .unwrap();
    assert!(st.rho().value > 0.01 && st.rho().value < 0.2);
}
