//! Flange test points with their auxiliary measurements.
//!
//! Leakage flows that were not measured are treated as zero, which leaves
//! the corresponding correction inactive.

use cc_core::units::{Area, MassRate, Pressure, Temperature};
use cc_point::Point;

use crate::bearing::BearingOil;

/// Seal-gas injection flow and temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealGas {
    pub flow: MassRate,
    pub t: Temperature,
}

/// Casing surface and the temperatures driving natural convection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CasingHeat {
    pub area: Area,
    pub t_casing: Temperature,
    pub t_ambient: Temperature,
}

/// Pressure and temperature measured upstream of a seal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealUpstream {
    pub p: Pressure,
    pub t: Temperature,
}

/// Single-section (straight-through) test point.
#[derive(Debug, Clone)]
pub struct Point1Sec {
    pub point: Point,
    /// Balance-line flow returned to suction
    pub balance_line_flow: Option<MassRate>,
    pub seal_gas: Option<SealGas>,
    /// Conditions upstream of the end seal; flange discharge when absent
    pub end_seal_upstream: Option<SealUpstream>,
    pub casing: Option<CasingHeat>,
    pub oil: Option<BearingOil>,
}

impl Point1Sec {
    /// Test point with no auxiliary measurements.
    pub fn new(point: Point) -> Self {
        Self {
            point,
            balance_line_flow: None,
            seal_gas: None,
            end_seal_upstream: None,
            casing: None,
            oil: None,
        }
    }
}

/// First (low-pressure) section of a back-to-back test point.
#[derive(Debug, Clone)]
pub struct PointFirstSection {
    pub point: Point,
    pub seal_gas: Option<SealGas>,
    /// Division-wall leakage into the first-section discharge
    pub division_wall_flow: Option<MassRate>,
    /// Flow measured at the first-section discharge flange
    pub first_section_discharge_flow: Option<MassRate>,
    pub casing: Option<CasingHeat>,
    pub oil: Option<BearingOil>,
}

impl PointFirstSection {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            seal_gas: None,
            division_wall_flow: None,
            first_section_discharge_flow: None,
            casing: None,
            oil: None,
        }
    }
}

/// Second (high-pressure) section of a back-to-back test point.
#[derive(Debug, Clone)]
pub struct PointSecondSection {
    pub point: Point,
    /// End-seal leakage from the second-section suction, measured in the
    /// balance line
    pub balance_line_flow: Option<MassRate>,
    /// Conditions upstream of the end seal; second-section suction when absent
    pub end_seal_upstream: Option<SealUpstream>,
    /// Conditions upstream of the division wall; second-section discharge
    /// when absent
    pub division_wall_upstream: Option<SealUpstream>,
    pub casing: Option<CasingHeat>,
}

impl PointSecondSection {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            balance_line_flow: None,
            end_seal_upstream: None,
            division_wall_upstream: None,
            casing: None,
        }
    }
}

pub(crate) fn flow_or_zero(flow: Option<MassRate>) -> f64 {
    flow.map_or(0.0, |m| m.value)
}
