//! Dilute-gas viscosity.
//!
//! Pure components use the Chung et al. (1988) corresponding-states
//! correlation; mixtures combine them with Wilke's rule. Pressure effects are
//! neglected, which is adequate at compressor suction where the value only
//! feeds the machine Reynolds number.

use crate::composition::Composition;
use crate::species::SpeciesConstants;

/// Chung collision-integral constants.
const OMEGA_A: f64 = 1.16145;
const OMEGA_B: f64 = 0.14874;
const OMEGA_C: f64 = 0.52487;
const OMEGA_D: f64 = 0.77320;
const OMEGA_E: f64 = 2.16178;
const OMEGA_F: f64 = 2.43787;

/// Viscosity of a pure dilute gas [Pa·s].
pub fn chung_viscosity(c: &SpeciesConstants, t: f64) -> f64 {
    let t_star = 1.2593 * t / c.tc;
    let omega_v = OMEGA_A * t_star.powf(-OMEGA_B)
        + OMEGA_C * (-OMEGA_D * t_star).exp()
        + OMEGA_E * (-OMEGA_F * t_star).exp();
    let mu_r = 131.3 * c.dipole / (c.vc * c.tc).sqrt();
    let fc = 1.0 - 0.2756 * c.omega + 0.059035 * mu_r.powi(4);
    // micropoise
    let eta = 40.785 * fc * (c.molar_mass * t).sqrt() / (c.vc.powf(2.0 / 3.0) * omega_v);
    eta * 1e-7
}

/// Viscosity of a dilute gas mixture [Pa·s].
pub fn mixture_viscosity(comp: &Composition, t: f64) -> f64 {
    let parts: Vec<(f64, f64, f64)> = comp
        .iter()
        .map(|(s, x)| {
            let c = s.constants();
            (x, chung_viscosity(c, t), c.molar_mass)
        })
        .collect();

    if parts.len() == 1 {
        return parts[0].1;
    }

    parts
        .iter()
        .map(|&(xi, eta_i, mi)| {
            let denom: f64 = parts
                .iter()
                .map(|&(xj, eta_j, mj)| {
                    let num = (1.0 + (eta_i / eta_j).sqrt() * (mj / mi).powf(0.25)).powi(2);
                    let phi = num / (8.0 * (1.0 + mi / mj)).sqrt();
                    xj * phi
                })
                .sum();
            xi * eta_i / denom
        })
        .sum()
}
