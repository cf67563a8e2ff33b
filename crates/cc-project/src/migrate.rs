//! Schema migration framework.

use crate::ProjectError;
use crate::schema::{CompositionDef, FORMAT, Project};

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        1 => migrate_v1_to_v2(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    project.version = 1;
    Ok(project)
}

/// Version 1 files carried no `format` tag and wrote pure fluids as
/// one-entry mixtures.
fn migrate_v1_to_v2(mut project: Project) -> Result<Project, ProjectError> {
    if project.format.is_empty() {
        project.format = FORMAT.to_string();
    }

    if let CompositionDef::Mixture { fractions } = &project.fluid.composition {
        if let [(species, _)] = fractions.as_slice() {
            project.fluid.composition = CompositionDef::Pure {
                species: species.clone(),
            };
        }
    }

    project.version = 2;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        CompressorDef, CorrectionsDef, FluidBackendDef, FluidDef, GeometryDef, PointDef,
        PolytropicMethodDef,
    };

    fn project(version: u32, format: &str, composition: CompositionDef) -> Project {
        Project {
            format: format.to_string(),
            version,
            name: "test".to_string(),
            description: None,
            fluid: FluidDef {
                backend: FluidBackendDef::PengRobinson,
                composition,
            },
            method: PolytropicMethodDef::Schultz,
            corrections: CorrectionsDef::default(),
            compressor: CompressorDef::StraightThrough {
                geometry: GeometryDef {
                    b: "28.5 mm".to_string(),
                    d: "365 mm".to_string(),
                    surface_roughness: None,
                },
                guarantee: PointDef::default(),
                test_points: vec![],
            },
            speed: None,
        }
    }

    #[test]
    fn migrate_latest_is_noop() {
        let p = project(
            LATEST_VERSION,
            FORMAT,
            CompositionDef::Mixture {
                fractions: vec![("CO2".to_string(), 0.8), ("N2".to_string(), 0.2)],
            },
        );
        let migrated = migrate_to_latest(p.clone()).unwrap();
        assert_eq!(migrated, p);
    }

    #[test]
    fn migrate_v1_tags_format_and_collapses_pure_mixture() {
        let p = project(
            1,
            "",
            CompositionDef::Mixture {
                fractions: vec![("N2".to_string(), 1.0)],
            },
        );
        let migrated = migrate_to_latest(p).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.format, FORMAT);
        assert_eq!(
            migrated.fluid.composition,
            CompositionDef::Pure {
                species: "N2".to_string()
            }
        );
    }

    #[test]
    fn migrate_from_v0_walks_every_step() {
        let p = project(0, "", CompositionDef::Pure { species: "CO2".to_string() });
        let migrated = migrate_to_latest(p).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.format, FORMAT);
    }
}
