//! Project loading, saving, evaluation and speed matching.

use std::fmt;
use std::path::Path;

use cc_compressor::{ConvertedPoint, GuaranteeRatios};
use cc_core::units::to_rpm;
use cc_point::{Point, PolytropicMethod};
use cc_project::Project;
use tracing::info;

use crate::build::{Assembly, Engine, build_assembly};
use crate::error::AppResult;

/// Load, migrate and validate a YAML or JSON project.
pub fn load_project(path: &Path) -> AppResult<Project> {
    Ok(cc_project::load(path)?)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    Ok(cc_project::save(path, project)?)
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    Ok(cc_project::validate_project(project)?)
}

/// Headline values of one point, SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSummary {
    pub flow_m: f64,
    pub flow_v: f64,
    pub suction_p: f64,
    pub suction_t: f64,
    pub discharge_p: f64,
    pub discharge_t: f64,
    pub head: f64,
    pub eff: f64,
    pub power: f64,
    pub speed_rpm: f64,
    pub phi: f64,
    pub psi: f64,
    pub mach: f64,
    pub reynolds: f64,
}

impl From<&Point> for PointSummary {
    fn from(p: &Point) -> Self {
        Self {
            flow_m: p.flow_m().value,
            flow_v: p.flow_v().value,
            suction_p: p.suc().p().value,
            suction_t: p.suc().t().value,
            discharge_p: p.disch().p().value,
            discharge_t: p.disch().t().value,
            head: p.head(),
            eff: p.eff(),
            power: p.power().value,
            speed_rpm: to_rpm(p.speed()),
            phi: p.phi(),
            psi: p.psi(),
            mach: p.mach(),
            reynolds: p.reynolds(),
        }
    }
}

/// One converted test point.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub flange_test: PointSummary,
    pub flange_sp: PointSummary,
    pub mach_deviation: f64,
    pub equivalent_speed_rpm: Option<f64>,
}

impl From<&ConvertedPoint> for TestSummary {
    fn from(c: &ConvertedPoint) -> Self {
        Self {
            flange_test: (&c.flange_test).into(),
            flange_sp: (&c.flange_sp).into(),
            mach_deviation: c.mach_deviation,
            equivalent_speed_rpm: c.equivalent_speed.map(to_rpm),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSummary {
    pub name: &'static str,
    pub guarantee: PointSummary,
    /// Flange point at specified conditions and guarantee flow
    pub specified: PointSummary,
    pub ratios: GuaranteeRatios,
    pub tests: Vec<TestSummary>,
}

/// Result of rebuilding a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub kind: &'static str,
    pub method: PolytropicMethod,
    pub speed_rpm: f64,
    pub sections: Vec<SectionSummary>,
    /// Bearing losses at the operating speed [W]
    pub mechanical_losses: f64,
    /// [W]
    pub shaft_power: f64,
}

impl Evaluation {
    pub fn from_assembly(assembly: &Assembly) -> Self {
        let (sections, mechanical_losses, shaft_power) = match assembly {
            Assembly::StraightThrough(a) => (
                vec![SectionSummary {
                    name: "section",
                    guarantee: a.guarantee().into(),
                    specified: a.point_guarantee().into(),
                    ratios: a.ratios(),
                    tests: a.points().iter().map(TestSummary::from).collect(),
                }],
                a.mechanical_losses().value,
                a.shaft_power().value,
            ),
            Assembly::BackToBack(a) => (
                vec![
                    SectionSummary {
                        name: "first section",
                        guarantee: a.guarantee_first().into(),
                        specified: a.point_first_guarantee().into(),
                        ratios: a.ratios_first(),
                        tests: a.points().iter().map(|p| (&p.first).into()).collect(),
                    },
                    SectionSummary {
                        name: "second section",
                        guarantee: a.guarantee_second().into(),
                        specified: a.point_second_guarantee().into(),
                        ratios: a.ratios_second(),
                        tests: a.points().iter().map(|p| (&p.second).into()).collect(),
                    },
                ],
                a.mechanical_losses().value,
                a.shaft_power().value,
            ),
        };
        Self {
            kind: assembly.kind(),
            method: assembly.method(),
            speed_rpm: to_rpm(assembly.speed()),
            sections,
            mechanical_losses,
            shaft_power,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} compressor, {} method, {:.1} rpm",
            self.kind, self.method, self.speed_rpm
        )?;
        for s in &self.sections {
            writeln!(f, "{}:", s.name)?;
            writeln!(
                f,
                "  guarantee   p_d {:8.4} bar  head {:9.1} J/kg  eff {:.4}  power {:9.2} kW",
                s.guarantee.discharge_p / 1e5,
                s.guarantee.head,
                s.guarantee.eff,
                s.guarantee.power / 1e3
            )?;
            writeln!(
                f,
                "  specified   p_d {:8.4} bar  head {:9.1} J/kg  eff {:.4}  power {:9.2} kW",
                s.specified.discharge_p / 1e5,
                s.specified.head,
                s.specified.eff,
                s.specified.power / 1e3
            )?;
            writeln!(
                f,
                "  ratios      head {:.4}  flow {:.4}  power {:.4}  p_d {:.4}",
                s.ratios.head, s.ratios.flow, s.ratios.power, s.ratios.disch_p
            )?;
            for (i, t) in s.tests.iter().enumerate() {
                let equivalent = t
                    .equivalent_speed_rpm
                    .map_or_else(|| "n/a".to_string(), |w| format!("{w:.1} rpm"));
                writeln!(
                    f,
                    "  test {:<2}     flow {:.4} m3/s  eff {:.4} -> {:.4}  mach dev {:+.4}  equivalent speed {}",
                    i + 1,
                    t.flange_test.flow_v,
                    t.flange_test.eff,
                    t.flange_sp.eff,
                    t.mach_deviation,
                    equivalent
                )?;
            }
        }
        if self.mechanical_losses > 0.0 {
            writeln!(f, "mechanical losses {:.2} kW", self.mechanical_losses / 1e3)?;
        }
        write!(f, "shaft power {:.2} kW", self.shaft_power / 1e3)
    }
}

/// Rebuild every point and conversion of a project.
pub fn evaluate_project(project: &Project) -> AppResult<Evaluation> {
    let engine = Engine::for_project(project);
    let assembly = build_assembly(&engine.context(), project)?;
    Ok(Evaluation::from_assembly(&assembly))
}

/// Match the operating speed to the guarantee discharge pressure. Returns
/// the project with the resolved speed written into it.
pub fn match_speed(project: &Project) -> AppResult<(Project, Evaluation)> {
    let engine = Engine::for_project(project);
    let ctx = engine.context();
    let matched = build_assembly(&ctx, project)?.match_speed(&ctx)?;

    let mut updated = project.clone();
    updated.speed = Some(format!("{} rpm", to_rpm(matched.speed())));
    info!(speed = updated.speed.as_deref(), "resolved operating speed");
    Ok((updated, Evaluation::from_assembly(&matched)))
}

/// [`match_speed`] on a file, saving the resolved speed back to it.
pub fn match_speed_and_save(path: &Path) -> AppResult<Evaluation> {
    let project = load_project(path)?;
    let (updated, evaluation) = match_speed(&project)?;
    save_project(path, &updated)?;
    Ok(evaluation)
}
