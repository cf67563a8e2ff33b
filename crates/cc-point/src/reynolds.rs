//! Machine Reynolds and Mach number corrections and checks (ASME PTC 10-1997).

use std::fmt;
use std::str::FromStr;

use crate::error::PerfError;
use cc_core::constants::{M_PER_FT, M_PER_IN};
use cc_core::units::Length;

/// Roughness at which the PTC 10 roughness term is unity [in].
pub const REFERENCE_ROUGHNESS_IN: f64 = 0.000_125;

/// Reynolds-number efficiency correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReynoldsCorrection {
    /// Efficiency carried over unchanged.
    #[default]
    None,
    /// PTC 10-1997 equation 5.2 correlation.
    Ptc1997,
}

impl ReynoldsCorrection {
    pub fn key(&self) -> &'static str {
        match self {
            ReynoldsCorrection::None => "none",
            ReynoldsCorrection::Ptc1997 => "ptc1997",
        }
    }
}

impl fmt::Display for ReynoldsCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReynoldsCorrection {
    type Err = PerfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "none" | "off" => Ok(ReynoldsCorrection::None),
            "ptc1997" | "ptc10" => Ok(ReynoldsCorrection::Ptc1997),
            _ => Err(PerfError::InvalidArg {
                what: "unknown Reynolds correction",
            }),
        }
    }
}

/// `RA`: width-dependent term.
pub fn ra(reynolds: f64, b: Length) -> f64 {
    let b_ft = b.value / M_PER_FT;
    let c = 0.988 / reynolds.powf(0.243);
    0.066 + 0.934 * (4.8e6 * b_ft / reynolds).powf(c)
}

/// `RB`: roughness-dependent term; 1 at the reference roughness.
pub fn rb(reynolds: f64, roughness: Length) -> f64 {
    let eps_in = roughness.value / M_PER_IN;
    (REFERENCE_ROUGHNESS_IN + 13.67 / reynolds).log10() / (eps_in + 13.67 / reynolds).log10()
}

/// Machine Reynolds number and the geometry it was computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReynoldsCondition {
    pub reynolds: f64,
    pub b: Length,
    pub roughness: Length,
}

impl ReynoldsCondition {
    fn factor(&self) -> f64 {
        ra(self.reynolds, self.b) * rb(self.reynolds, self.roughness)
    }
}

/// Efficiency at the specified condition from the test efficiency:
/// `(1 - eff_sp) / (1 - eff_t) = (RA_sp RB_sp) / (RA_t RB_t)`.
pub fn corrected_efficiency(
    eff_test: f64,
    test: &ReynoldsCondition,
    specified: &ReynoldsCondition,
) -> f64 {
    1.0 - (1.0 - eff_test) * specified.factor() / test.factor()
}

/// Test-to-specified Reynolds ratio band outside which the correlation is
/// extrapolated.
pub const REYNOLDS_RATIO_BAND: (f64, f64) = (0.1, 10.0);

/// PTC 10 Type 2 limits on `mach_test - mach_specified`, as (lower, upper).
pub fn mach_deviation_limits(mach_specified: f64) -> (f64, f64) {
    let lower = if mach_specified < 0.215 {
        -mach_specified
    } else if mach_specified <= 0.86 {
        0.266 * mach_specified - 0.271
    } else {
        -0.042
    };
    let upper = if mach_specified <= 0.86 {
        -0.25 * mach_specified + 0.286
    } else {
        0.07
    };
    (lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_core::units::{m, mm};

    fn cond(re: f64) -> ReynoldsCondition {
        ReynoldsCondition {
            reynolds: re,
            b: mm(28.5),
            roughness: m(REFERENCE_ROUGHNESS_IN * M_PER_IN),
        }
    }

    #[test]
    fn reference_roughness_has_unit_rb() {
        assert!((rb(1e6, m(REFERENCE_ROUGHNESS_IN * M_PER_IN)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn equal_reynolds_leaves_efficiency_unchanged() {
        let eff = corrected_efficiency(0.78, &cond(2e6), &cond(2e6));
        assert!((eff - 0.78).abs() < 1e-14);
    }

    #[test]
    fn higher_reynolds_improves_efficiency() {
        let eff = corrected_efficiency(0.78, &cond(1e6), &cond(5e6));
        assert!(eff > 0.78 && eff < 0.80, "{eff}");
    }

    #[test]
    fn rougher_surface_raises_loss_factor() {
        let smooth = rb(5e6, m(REFERENCE_ROUGHNESS_IN * M_PER_IN));
        let rough = rb(5e6, m(0.000_25 * M_PER_IN));
        assert!(rough > smooth);
    }

    #[test]
    fn mach_limits_are_continuous() {
        let (lo_a, up_a) = mach_deviation_limits(0.2149);
        let (lo_b, up_b) = mach_deviation_limits(0.2151);
        assert!((up_a - up_b).abs() < 1e-3);
        assert!((lo_a - lo_b).abs() < 0.01);
        assert_eq!(mach_deviation_limits(1.0), (-0.042, 0.07));
    }

    #[test]
    fn parse_correction() {
        assert_eq!(
            "PTC-1997".parse::<ReynoldsCorrection>().unwrap(),
            ReynoldsCorrection::Ptc1997
        );
        assert_eq!(
            "none".parse::<ReynoldsCorrection>().unwrap(),
            ReynoldsCorrection::None
        );
        assert!("table".parse::<ReynoldsCorrection>().is_err());
    }
}
