//! Project definitions to engine values.
//!
//! Unit-tagged text is converted to SI here and nowhere else. Every point is
//! rebuilt by re-running its closure, so a loaded project always reflects
//! the current engine.

use cc_compressor::{
    BackToBack, BackToBackTest, BearingOil, CasingHeat, CorrectionConfig, IsoVg, OilProperties,
    OilStream, Point1Sec, PointFirstSection, PointSecondSection, SealGas, SealUpstream,
    StraightThrough,
};
use cc_core::units::{AngularVelocity, k, kgpm3, kgps, m, m2, m3ps, pa, rad_per_s};
use cc_fluids::{Composition, CoolPropModel, FluidModel, PengRobinsonModel, Quantity, StateInput};
use cc_point::{Flow, Geometry, PerfContext, Point, PointSpec, PolytropicMethod};
use cc_project::{
    CasingDef, CompressorDef, CorrectionsDef, FluidBackendDef, FluidDef, GeometryDef, IsoVgDef,
    OilDef, OilPropertiesDef, OilStreamDef, PointDef, Project, SealGasDef,
    StraightThroughTestDef, UpstreamDef, parse_field,
};
use rayon::prelude::*;

use crate::error::{AppError, AppResult};

fn field(name: &str, raw: &str, quantity: Quantity) -> AppResult<f64> {
    Ok(parse_field(name, raw, quantity)?)
}

fn optional(name: &str, raw: Option<&String>, quantity: Quantity) -> AppResult<Option<f64>> {
    raw.map(|r| field(name, r, quantity)).transpose()
}

pub fn build_fluid_model(fluid: &FluidDef) -> Box<dyn FluidModel> {
    match fluid.backend {
        FluidBackendDef::PengRobinson => Box::new(PengRobinsonModel::new()),
        FluidBackendDef::CoolProp => Box::new(CoolPropModel::new()),
    }
}

pub fn build_composition(fluid: &FluidDef) -> AppResult<Composition> {
    Ok(Composition::from_names(&fluid.composition.fractions())?)
}

pub fn build_config(corrections: &CorrectionsDef) -> CorrectionConfig {
    CorrectionConfig {
        reynolds: corrections.reynolds.into(),
        bearing_mechanical_losses: corrections.bearing_mechanical_losses,
        casing_heat_loss: corrections.casing_heat_loss,
        leakages: corrections.leakages,
    }
}

pub fn build_geometry(name: &str, def: &GeometryDef) -> AppResult<Geometry> {
    let geometry = Geometry::new(
        m(field(&format!("{name}.b"), &def.b, Quantity::Length)?),
        m(field(&format!("{name}.d"), &def.d, Quantity::Length)?),
    );
    match &def.surface_roughness {
        Some(r) => Ok(geometry.with_roughness(m(field(
            &format!("{name}.surface_roughness"),
            r,
            Quantity::Length,
        )?))),
        None => Ok(geometry),
    }
}

/// Fluid backend and polytropic method of one project.
pub struct Engine {
    model: Box<dyn FluidModel>,
    method: PolytropicMethod,
}

impl Engine {
    pub fn new(model: Box<dyn FluidModel>, method: PolytropicMethod) -> Self {
        Self { model, method }
    }

    pub fn for_project(project: &Project) -> Self {
        Self::new(build_fluid_model(&project.fluid), project.method.into())
    }

    pub fn context(&self) -> PerfContext<'_> {
        PerfContext::new(self.model.as_ref(), self.method)
    }
}

/// Close a point from its raw inputs.
pub fn build_point(
    ctx: &PerfContext<'_>,
    composition: &Composition,
    name: &str,
    def: &PointDef,
    geometry: Geometry,
) -> AppResult<Point> {
    let suc = ctx.fluid.state(
        StateInput::PT {
            p: pa(field(
                &format!("{name}.suction_pressure"),
                &def.suction_pressure,
                Quantity::Pressure,
            )?),
            t: k(field(
                &format!("{name}.suction_temperature"),
                &def.suction_temperature,
                Quantity::Temperature,
            )?),
        },
        composition.clone(),
    )?;

    let p_d = optional(
        &format!("{name}.discharge_pressure"),
        def.discharge_pressure.as_ref(),
        Quantity::Pressure,
    )?;
    let t_d = optional(
        &format!("{name}.discharge_temperature"),
        def.discharge_temperature.as_ref(),
        Quantity::Temperature,
    )?;
    let (disch, disch_p) = match (p_d, t_d) {
        (Some(p), Some(t)) => (
            Some(suc.update(ctx.fluid, StateInput::PT { p: pa(p), t: k(t) })?),
            None,
        ),
        (Some(p), None) => (None, Some(pa(p))),
        (None, Some(_)) => {
            return Err(AppError::InvalidValue {
                field: format!("{name}.discharge_temperature"),
                reason: "discharge temperature needs a discharge pressure".to_string(),
            });
        }
        (None, None) => (None, None),
    };

    let spec = PointSpec {
        suc: Some(suc),
        disch,
        eff: optional(&format!("{name}.eff"), def.eff.as_ref(), Quantity::Dimensionless)?,
        head: optional(
            &format!("{name}.head"),
            def.head.as_ref(),
            Quantity::SpecificEnthalpy,
        )?,
        volume_ratio: def.volume_ratio,
        disch_p,
    };

    let flow = match (&def.mass_flow, &def.volume_flow) {
        (Some(mf), None) => Flow::Mass(kgps(field(
            &format!("{name}.mass_flow"),
            mf,
            Quantity::MassFlow,
        )?)),
        (None, Some(qf)) => Flow::Volume(m3ps(field(
            &format!("{name}.volume_flow"),
            qf,
            Quantity::VolumeFlow,
        )?)),
        _ => {
            return Err(AppError::InvalidValue {
                field: format!("{name}.mass_flow"),
                reason: "give exactly one of mass_flow and volume_flow".to_string(),
            });
        }
    };
    let speed = rad_per_s(field(
        &format!("{name}.speed"),
        &def.speed,
        Quantity::AngularSpeed,
    )?);

    Ok(Point::from_spec(ctx, spec, flow, speed, geometry)?)
}

fn seal_gas(name: &str, def: Option<&SealGasDef>) -> AppResult<Option<SealGas>> {
    def.map(|sg| {
        Ok(SealGas {
            flow: kgps(field(&format!("{name}.seal_gas.flow"), &sg.flow, Quantity::MassFlow)?),
            t: k(field(
                &format!("{name}.seal_gas.temperature"),
                &sg.temperature,
                Quantity::Temperature,
            )?),
        })
    })
    .transpose()
}

fn upstream(name: &str, def: Option<&UpstreamDef>) -> AppResult<Option<SealUpstream>> {
    def.map(|up| {
        Ok(SealUpstream {
            p: pa(field(&format!("{name}.pressure"), &up.pressure, Quantity::Pressure)?),
            t: k(field(
                &format!("{name}.temperature"),
                &up.temperature,
                Quantity::Temperature,
            )?),
        })
    })
    .transpose()
}

fn casing(name: &str, def: Option<&CasingDef>) -> AppResult<Option<CasingHeat>> {
    def.map(|c| {
        Ok(CasingHeat {
            area: m2(field(&format!("{name}.casing.area"), &c.area, Quantity::Area)?),
            t_casing: k(field(
                &format!("{name}.casing.temperature"),
                &c.temperature,
                Quantity::Temperature,
            )?),
            t_ambient: k(field(
                &format!("{name}.casing.ambient_temperature"),
                &c.ambient_temperature,
                Quantity::Temperature,
            )?),
        })
    })
    .transpose()
}

fn oil_stream(name: &str, def: Option<&OilStreamDef>) -> AppResult<Option<OilStream>> {
    def.map(|s| {
        Ok(OilStream {
            flow: m3ps(field(&format!("{name}.flow"), &s.flow, Quantity::VolumeFlow)?),
            t_out: k(field(
                &format!("{name}.outlet_temperature"),
                &s.outlet_temperature,
                Quantity::Temperature,
            )?),
        })
    })
    .transpose()
}

fn oil(name: &str, def: Option<&OilDef>) -> AppResult<Option<BearingOil>> {
    let Some(def) = def else {
        return Ok(None);
    };
    let properties = match &def.properties {
        OilPropertiesDef::Iso { grade } => OilProperties::Iso(match grade {
            IsoVgDef::Vg32 => IsoVg::Vg32,
            IsoVgDef::Vg46 => IsoVg::Vg46,
            IsoVgDef::Vg68 => IsoVg::Vg68,
        }),
        OilPropertiesDef::Fixed { density, cp } => OilProperties::Fixed {
            rho: kgpm3(field(
                &format!("{name}.oil.properties.density"),
                density,
                Quantity::Density,
            )?),
            cp: field(
                &format!("{name}.oil.properties.cp"),
                cp,
                Quantity::SpecificEntropy,
            )?,
        },
    };
    Ok(Some(BearingOil {
        t_in: k(field(
            &format!("{name}.oil.inlet_temperature"),
            &def.inlet_temperature,
            Quantity::Temperature,
        )?),
        journal_de: oil_stream(&format!("{name}.oil.journal_de"), def.journal_de.as_ref())?,
        journal_nde: oil_stream(&format!("{name}.oil.journal_nde"), def.journal_nde.as_ref())?,
        thrust: oil_stream(&format!("{name}.oil.thrust"), def.thrust.as_ref())?,
        properties,
    }))
}

fn mass_flow(name: &str, raw: Option<&String>) -> AppResult<Option<cc_core::units::MassRate>> {
    Ok(optional(name, raw, Quantity::MassFlow)?.map(kgps))
}

/// Single-section test point with its auxiliary measurements.
pub fn build_point_1sec(
    ctx: &PerfContext<'_>,
    composition: &Composition,
    name: &str,
    def: &StraightThroughTestDef,
    geometry: Geometry,
) -> AppResult<Point1Sec> {
    Ok(Point1Sec {
        point: build_point(ctx, composition, name, &def.point, geometry)?,
        balance_line_flow: mass_flow(
            &format!("{name}.balance_line_flow"),
            def.balance_line_flow.as_ref(),
        )?,
        seal_gas: seal_gas(name, def.seal_gas.as_ref())?,
        end_seal_upstream: upstream(
            &format!("{name}.end_seal_upstream"),
            def.end_seal_upstream.as_ref(),
        )?,
        casing: casing(name, def.casing.as_ref())?,
        oil: oil(name, def.oil.as_ref())?,
    })
}

/// Operating speed written in the project, if any.
pub fn project_speed(project: &Project) -> AppResult<Option<AngularVelocity>> {
    Ok(optional("speed", project.speed.as_ref(), Quantity::AngularSpeed)?.map(rad_per_s))
}

/// Guarantee point of the first section (the only one for a
/// straight-through compressor) or of the second section.
pub fn build_guarantee(
    ctx: &PerfContext<'_>,
    project: &Project,
    second: bool,
) -> AppResult<Point> {
    let composition = build_composition(&project.fluid)?;
    match (&project.compressor, second) {
        (
            CompressorDef::StraightThrough {
                geometry,
                guarantee,
                ..
            },
            false,
        ) => build_point(
            ctx,
            &composition,
            "guarantee",
            guarantee,
            build_geometry("geometry", geometry)?,
        ),
        (CompressorDef::StraightThrough { .. }, true) => Err(AppError::Unsupported {
            message: "a straight-through compressor has a single section".to_string(),
        }),
        (
            CompressorDef::BackToBack {
                geometry_first,
                guarantee_first,
                ..
            },
            false,
        ) => build_point(
            ctx,
            &composition,
            "guarantee_first",
            guarantee_first,
            build_geometry("geometry_first", geometry_first)?,
        ),
        (
            CompressorDef::BackToBack {
                geometry_second,
                guarantee_second,
                ..
            },
            true,
        ) => build_point(
            ctx,
            &composition,
            "guarantee_second",
            guarantee_second,
            build_geometry("geometry_second", geometry_second)?,
        ),
    }
}

/// Either assembly kind, rebuilt from a project.
#[derive(Debug, Clone)]
pub enum Assembly {
    StraightThrough(StraightThrough),
    BackToBack(BackToBack),
}

impl Assembly {
    pub fn kind(&self) -> &'static str {
        match self {
            Assembly::StraightThrough(_) => "straight-through",
            Assembly::BackToBack(_) => "back-to-back",
        }
    }

    pub fn speed(&self) -> AngularVelocity {
        match self {
            Assembly::StraightThrough(a) => a.speed(),
            Assembly::BackToBack(a) => a.speed(),
        }
    }

    pub fn method(&self) -> PolytropicMethod {
        match self {
            Assembly::StraightThrough(a) => a.method(),
            Assembly::BackToBack(a) => a.method(),
        }
    }

    /// New assembly at the speed that reproduces the guarantee discharge
    /// pressure.
    pub fn match_speed(&self, ctx: &PerfContext<'_>) -> AppResult<Self> {
        Ok(match self {
            Assembly::StraightThrough(a) => {
                Assembly::StraightThrough(a.calculate_speed_to_match_discharge_pressure(ctx)?)
            }
            Assembly::BackToBack(a) => {
                Assembly::BackToBack(a.calculate_speed_to_match_discharge_pressure(ctx)?)
            }
        })
    }
}

pub fn build_assembly(ctx: &PerfContext<'_>, project: &Project) -> AppResult<Assembly> {
    let composition = build_composition(&project.fluid)?;
    let config = build_config(&project.corrections);
    let speed = project_speed(project)?;

    match &project.compressor {
        CompressorDef::StraightThrough {
            geometry,
            guarantee,
            test_points,
        } => {
            let geometry = build_geometry("geometry", geometry)?;
            let guarantee = build_point(ctx, &composition, "guarantee", guarantee, geometry)?;
            let tests = test_points
                .par_iter()
                .enumerate()
                .map(|(i, t)| {
                    build_point_1sec(ctx, &composition, &format!("test_points[{i}]"), t, geometry)
                })
                .collect::<AppResult<Vec<_>>>()?;
            Ok(Assembly::StraightThrough(StraightThrough::new(
                ctx, guarantee, tests, config, speed,
            )?))
        }
        CompressorDef::BackToBack {
            geometry_first,
            geometry_second,
            guarantee_first,
            guarantee_second,
            test_points,
        } => {
            let g1 = build_geometry("geometry_first", geometry_first)?;
            let g2 = build_geometry("geometry_second", geometry_second)?;
            let guarantee_first =
                build_point(ctx, &composition, "guarantee_first", guarantee_first, g1)?;
            let guarantee_second =
                build_point(ctx, &composition, "guarantee_second", guarantee_second, g2)?;
            let tests = test_points
                .par_iter()
                .enumerate()
                .map(|(i, t)| {
                    let first = format!("test_points[{i}].first");
                    let second = format!("test_points[{i}].second");
                    Ok(BackToBackTest {
                        first: PointFirstSection {
                            point: build_point(ctx, &composition, &first, &t.first.point, g1)?,
                            seal_gas: seal_gas(&first, t.first.seal_gas.as_ref())?,
                            division_wall_flow: mass_flow(
                                &format!("{first}.division_wall_flow"),
                                t.first.division_wall_flow.as_ref(),
                            )?,
                            first_section_discharge_flow: mass_flow(
                                &format!("{first}.first_section_discharge_flow"),
                                t.first.first_section_discharge_flow.as_ref(),
                            )?,
                            casing: casing(&first, t.first.casing.as_ref())?,
                            oil: oil(&first, t.first.oil.as_ref())?,
                        },
                        second: PointSecondSection {
                            point: build_point(ctx, &composition, &second, &t.second.point, g2)?,
                            balance_line_flow: mass_flow(
                                &format!("{second}.balance_line_flow"),
                                t.second.balance_line_flow.as_ref(),
                            )?,
                            end_seal_upstream: upstream(
                                &format!("{second}.end_seal_upstream"),
                                t.second.end_seal_upstream.as_ref(),
                            )?,
                            division_wall_upstream: upstream(
                                &format!("{second}.division_wall_upstream"),
                                t.second.division_wall_upstream.as_ref(),
                            )?,
                            casing: casing(&second, t.second.casing.as_ref())?,
                        },
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;
            Ok(Assembly::BackToBack(BackToBack::new(
                ctx,
                guarantee_first,
                guarantee_second,
                tests,
                config,
                speed,
            )?))
        }
    }
}
