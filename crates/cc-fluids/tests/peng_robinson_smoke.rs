//! Peng-Robinson backend against reference gas data.

use cc_core::units::{bar, k};
use cc_fluids::{Composition, FluidModel, PengRobinsonModel, Species, StateInput};

#[test]
fn methane_density_at_pipeline_pressure() {
    // NIST: CH4 at 50 bar, 300 K -> 35.6 kg/m³
    let model = PengRobinsonModel::new();
    let st = model
        .state(
            StateInput::PT {
                p: bar(50.0),
                t: k(300.0),
            },
            Composition::pure(Species::CH4),
        )
        .unwrap();
    assert!((st.rho().value - 35.6).abs() < 1.0, "rho = {}", st.rho().value);
}

#[test]
fn mixture_properties_are_mole_weighted() {
    let model = PengRobinsonModel::new();
    let comp = Composition::from_names(&[("CO2", 50.0), ("N2", 50.0)]).unwrap();
    let st = model
        .state(
            StateInput::PT {
                p: bar(1.0),
                t: k(300.0),
            },
            comp,
        )
        .unwrap();

    let m = 0.5 * Species::CO2.molar_mass() + 0.5 * Species::N2.molar_mass();
    assert!((st.molar_mass() - m).abs() < 1e-9);
    // near-ideal: rho ≈ pM/RT
    let rho_ig = 1e5 * m * 1e-3 / (8.314462618 * 300.0);
    assert!((st.rho().value / rho_ig - 1.0).abs() < 0.01);
}

#[test]
fn enthalpy_rises_along_isobar() {
    let model = PengRobinsonModel::new();
    let comp = Composition::pure(Species::CO2);
    let h = |t: f64| {
        model
            .state(StateInput::PT { p: bar(5.0), t: k(t) }, comp.clone())
            .unwrap()
            .h()
    };
    let (h1, h2) = (h(300.0), h(310.0));
    // cp of CO2 near 300 K and 5 bar is close to 870 J/(kg K)
    let cp = (h2 - h1) / 10.0;
    assert!((cp - 870.0).abs() < 40.0, "cp = {cp}");
}
