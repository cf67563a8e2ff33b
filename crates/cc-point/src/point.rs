//! Operating points.

use std::f64::consts::PI;
use std::fmt;

use crate::closure;
use crate::error::{PerfError, PerfResult};
use crate::polytropic::{PolytropicMethod, polytropic_exponent};
use crate::reynolds::REFERENCE_ROUGHNESS_IN;
use cc_core::constants::M_PER_IN;
use cc_core::numeric::ensure_positive;
use cc_core::units::{
    AngularVelocity, Length, MassRate, Power, Pressure, Torque, Velocity, VolumeRate, kgps, m,
    m3ps, mps, newton_meters, watts,
};
use cc_fluids::{FluidModel, StateInput, ThermoState};
use cc_solver::NewtonConfig;
use tracing::debug;

/// Impeller geometry used by the dimensionless groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Impeller outlet width
    pub b: Length,
    /// Impeller outer diameter
    pub d: Length,
    /// Flow-path surface roughness
    pub surface_roughness: Length,
}

impl Geometry {
    /// Geometry with the PTC 10 reference roughness (125 µin).
    pub fn new(b: Length, d: Length) -> Self {
        Self {
            b,
            d,
            surface_roughness: m(REFERENCE_ROUGHNESS_IN * M_PER_IN),
        }
    }

    pub fn with_roughness(self, surface_roughness: Length) -> Self {
        Self {
            surface_roughness,
            ..self
        }
    }

    fn validate(&self) -> PerfResult<()> {
        for (value, what) in [(self.b, "impeller width b"), (self.d, "impeller diameter D")] {
            ensure_positive(value.value, what).map_err(|_| PerfError::InvalidArg {
                what: "impeller b and D must be positive",
            })?;
        }
        if !(self.surface_roughness.value.is_finite() && self.surface_roughness.value >= 0.0) {
            return Err(PerfError::InvalidArg {
                what: "surface roughness must be non-negative",
            });
        }
        Ok(())
    }
}

/// Property backend, correlation strategy and iteration settings threaded
/// through every point construction.
#[derive(Clone, Copy)]
pub struct PerfContext<'a> {
    pub fluid: &'a dyn FluidModel,
    pub method: PolytropicMethod,
    /// Settings for the discharge closures (step tolerance 0.1 Pa or 0.1 J/kg).
    pub newton: NewtonConfig,
}

impl<'a> PerfContext<'a> {
    pub fn new(fluid: &'a dyn FluidModel, method: PolytropicMethod) -> Self {
        Self {
            fluid,
            method,
            newton: NewtonConfig::with_step_tol(0.1),
        }
    }

    pub fn with_newton(self, newton: NewtonConfig) -> Self {
        Self { newton, ..self }
    }
}

impl fmt::Debug for PerfContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerfContext")
            .field("fluid", &self.fluid.name())
            .field("method", &self.method)
            .field("newton", &self.newton)
            .finish()
    }
}

/// Measured or specified flow; the other form follows from suction density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Mass(MassRate),
    Volume(VolumeRate),
}

/// Closed set of inputs a point can be built from.
#[derive(Debug, Clone)]
pub enum PointInput {
    /// Both states measured.
    DischSuc {
        suc: ThermoState,
        disch: ThermoState,
    },
    /// Efficiency and volume ratio (rho_d / rho_s) given.
    EffSucVolumeRatio {
        suc: ThermoState,
        eff: f64,
        volume_ratio: f64,
    },
    /// Efficiency and polytropic head [J/kg] given.
    EffHeadSuc {
        suc: ThermoState,
        eff: f64,
        head: f64,
    },
    /// Efficiency and discharge pressure given.
    EffDischPressureSuc {
        suc: ThermoState,
        eff: f64,
        disch_p: Pressure,
    },
}

impl PointInput {
    pub fn label(&self) -> &'static str {
        match self {
            PointInput::DischSuc { .. } => "DischSuc",
            PointInput::EffSucVolumeRatio { .. } => "EffSucVolumeRatio",
            PointInput::EffHeadSuc { .. } => "EffHeadSuc",
            PointInput::EffDischPressureSuc { .. } => "EffDischPressureSuc",
        }
    }

    pub fn suction(&self) -> &ThermoState {
        match self {
            PointInput::DischSuc { suc, .. }
            | PointInput::EffSucVolumeRatio { suc, .. }
            | PointInput::EffHeadSuc { suc, .. }
            | PointInput::EffDischPressureSuc { suc, .. } => suc,
        }
    }
}

/// Raw optional inputs, as they arrive from a project file or a table row.
#[derive(Debug, Clone, Default)]
pub struct PointSpec {
    pub suc: Option<ThermoState>,
    pub disch: Option<ThermoState>,
    pub eff: Option<f64>,
    pub head: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub disch_p: Option<Pressure>,
}

impl PointSpec {
    /// Names of the fields that are set.
    pub fn provided(&self) -> Vec<&'static str> {
        [
            ("suc", self.suc.is_some()),
            ("disch", self.disch.is_some()),
            ("eff", self.eff.is_some()),
            ("head", self.head.is_some()),
            ("volume_ratio", self.volume_ratio.is_some()),
            ("disch_p", self.disch_p.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Map the set of provided fields onto exactly one [`PointInput`].
    pub fn resolve(self) -> PerfResult<PointInput> {
        let provided = self.provided();
        match (
            self.suc,
            self.disch,
            self.eff,
            self.head,
            self.volume_ratio,
            self.disch_p,
        ) {
            (Some(suc), Some(disch), None, None, None, None) => {
                Ok(PointInput::DischSuc { suc, disch })
            }
            (Some(suc), None, Some(eff), None, Some(volume_ratio), None) => {
                Ok(PointInput::EffSucVolumeRatio {
                    suc,
                    eff,
                    volume_ratio,
                })
            }
            (Some(suc), None, Some(eff), Some(head), None, None) => {
                Ok(PointInput::EffHeadSuc { suc, eff, head })
            }
            (Some(suc), None, Some(eff), None, None, Some(disch_p)) => {
                Ok(PointInput::EffDischPressureSuc { suc, eff, disch_p })
            }
            _ => Err(PerfError::InvalidInputCombination {
                what: format!(
                    "[{}]; expected suc with one of [disch], [eff, volume_ratio], [eff, head], [eff, disch_p]",
                    provided.join(", ")
                ),
            }),
        }
    }
}

/// A closed compressor operating point.
///
/// All derived values are fixed at construction; the dimensionless groups
/// are computed from the stored states on access.
#[derive(Debug, Clone)]
pub struct Point {
    suc: ThermoState,
    disch: ThermoState,
    disch_s: ThermoState,
    flow_m: MassRate,
    flow_v: VolumeRate,
    speed: AngularVelocity,
    geometry: Geometry,
    method: PolytropicMethod,
    head: f64,
    eff: f64,
}

impl Point {
    /// Close `input` and derive everything else.
    pub fn new(
        ctx: &PerfContext<'_>,
        input: PointInput,
        flow: Flow,
        speed: AngularVelocity,
        geometry: Geometry,
    ) -> PerfResult<Self> {
        geometry.validate()?;
        if !(speed.value.is_finite() && speed.value > 0.0) {
            return Err(PerfError::InvalidArg {
                what: "speed must be positive",
            });
        }
        let label = input.label();

        let (suc, disch) = closure::close(ctx, input)?;
        let perf = ctx.method.evaluate(ctx.fluid, &suc, &disch)?;
        let disch_s = suc.update(
            ctx.fluid,
            StateInput::PS {
                p: disch.p(),
                s: suc.s(),
            },
        )?;

        let rho_s = suc.rho().value;
        let (flow_m, flow_v) = match flow {
            Flow::Mass(m) => (m, m3ps(m.value / rho_s)),
            Flow::Volume(q) => (kgps(q.value * rho_s), q),
        };
        if !(flow_m.value.is_finite() && flow_m.value > 0.0) {
            return Err(PerfError::InvalidArg {
                what: "flow must be positive",
            });
        }

        debug!(
            input = label,
            method = %ctx.method,
            eff = perf.eff,
            head = perf.head,
            p_d = disch.p().value,
            "point closed"
        );

        Ok(Self {
            suc,
            disch,
            disch_s,
            flow_m,
            flow_v,
            speed,
            geometry,
            method: ctx.method,
            head: perf.head,
            eff: perf.eff,
        })
    }

    /// Resolve raw optional inputs and build the point.
    pub fn from_spec(
        ctx: &PerfContext<'_>,
        spec: PointSpec,
        flow: Flow,
        speed: AngularVelocity,
        geometry: Geometry,
    ) -> PerfResult<Self> {
        Self::new(ctx, spec.resolve()?, flow, speed, geometry)
    }

    pub fn suc(&self) -> &ThermoState {
        &self.suc
    }

    pub fn disch(&self) -> &ThermoState {
        &self.disch
    }

    /// Isentropic state at discharge pressure.
    pub fn disch_isentropic(&self) -> &ThermoState {
        &self.disch_s
    }

    pub fn flow_m(&self) -> MassRate {
        self.flow_m
    }

    pub fn flow_v(&self) -> VolumeRate {
        self.flow_v
    }

    pub fn speed(&self) -> AngularVelocity {
        self.speed
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Correlation strategy the point was built with.
    pub fn method(&self) -> PolytropicMethod {
        self.method
    }

    /// Polytropic head [J/kg].
    pub fn head(&self) -> f64 {
        self.head
    }

    /// Polytropic efficiency.
    pub fn eff(&self) -> f64 {
        self.eff
    }

    /// Isentropic head h(p_d, s_s) - h_s [J/kg].
    pub fn head_isentropic(&self) -> f64 {
        self.disch_s.h() - self.suc.h()
    }

    pub fn eff_isentropic(&self) -> f64 {
        self.head_isentropic() / (self.disch.h() - self.suc.h())
    }

    /// Polytropic volume exponent n.
    pub fn polytropic_exponent(&self) -> f64 {
        polytropic_exponent(&self.suc, &self.disch)
    }

    /// Gas power m (h_d - h_s).
    pub fn power(&self) -> Power {
        watts(self.flow_m.value * (self.disch.h() - self.suc.h()))
    }

    pub fn torque(&self) -> Torque {
        newton_meters(self.power().value / self.speed.value)
    }

    pub fn pressure_ratio(&self) -> f64 {
        self.disch.p().value / self.suc.p().value
    }

    /// rho_d / rho_s (suction over discharge specific volume).
    pub fn volume_ratio(&self) -> f64 {
        self.disch.rho().value / self.suc.rho().value
    }

    /// Impeller tip speed.
    pub fn tip_speed(&self) -> Velocity {
        mps(self.speed.value * self.geometry.d.value / 2.0)
    }

    /// Flow coefficient Q / (pi D² / 4 u).
    pub fn phi(&self) -> f64 {
        let d = self.geometry.d.value;
        self.flow_v.value / (PI * d * d / 4.0 * self.tip_speed().value)
    }

    /// Head coefficient head / (u² / 2).
    pub fn psi(&self) -> f64 {
        let u = self.tip_speed().value;
        self.head / (u * u / 2.0)
    }

    /// Machine Mach number u / a_s.
    pub fn mach(&self) -> f64 {
        self.tip_speed().value / self.suc.speed_of_sound().value
    }

    /// Machine Reynolds number u b / nu_s.
    pub fn reynolds(&self) -> f64 {
        self.tip_speed().value * self.geometry.b.value / self.suc.kinematic_viscosity()
    }
}
