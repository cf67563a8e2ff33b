//! Corrections applied when converting test points to specified conditions.

use cc_point::ReynoldsCorrection;

/// Which corrections an assembly applies.
///
/// The default applies none of them: flange and rotor points coincide and
/// the efficiency is carried over unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorrectionConfig {
    pub reynolds: ReynoldsCorrection,
    /// Add oil-calorimetric bearing losses to the shaft power.
    pub bearing_mechanical_losses: bool,
    /// Correct the rotor discharge for heat lost through the casing.
    pub casing_heat_loss: bool,
    /// Balance balance-line, seal-gas and division-wall flows.
    pub leakages: bool,
}

impl CorrectionConfig {
    /// Every correction enabled, with the PTC 10-1997 Reynolds correlation.
    pub fn all() -> Self {
        Self {
            reynolds: ReynoldsCorrection::Ptc1997,
            bearing_mechanical_losses: true,
            casing_heat_loss: true,
            leakages: true,
        }
    }
}
