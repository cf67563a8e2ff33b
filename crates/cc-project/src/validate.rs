//! Project validation logic.

use cc_fluids::{Composition, Quantity, parse_quantity};

use crate::migrate::LATEST_VERSION;
use crate::schema::{
    CasingDef, CompressorDef, FORMAT, GeometryDef, OilDef, OilPropertiesDef, OilStreamDef,
    PointDef, Project, SealGasDef, UpstreamDef,
};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported format: '{format}' (expected '{FORMAT}')")]
    UnsupportedFormat { format: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing value: {field}")]
    Missing { field: String },
}

/// Parse a unit-tagged field to its SI value.
pub fn parse_field(field: &str, raw: &str, quantity: Quantity) -> Result<f64, ValidationError> {
    parse_quantity(raw, quantity).map_err(|e| ValidationError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn positive(field: &str, raw: &str, quantity: Quantity) -> Result<f64, ValidationError> {
    let value = parse_field(field, raw, quantity)?;
    if !(value.is_finite() && value > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(value)
}

fn optional(
    field: &str,
    raw: Option<&String>,
    quantity: Quantity,
) -> Result<Option<f64>, ValidationError> {
    raw.map(|r| positive(field, r, quantity)).transpose()
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.format != FORMAT {
        return Err(ValidationError::UnsupportedFormat {
            format: project.format.clone(),
        });
    }
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let fractions = project.fluid.composition.fractions();
    Composition::from_names(&fractions).map_err(|e| ValidationError::InvalidValue {
        field: "fluid.composition".to_string(),
        value: format!("{fractions:?}"),
        reason: e.to_string(),
    })?;

    optional("speed", project.speed.as_ref(), Quantity::AngularSpeed)?;

    match &project.compressor {
        CompressorDef::StraightThrough {
            geometry,
            guarantee,
            test_points,
        } => {
            validate_geometry("geometry", geometry)?;
            validate_point("guarantee", guarantee)?;
            if test_points.is_empty() {
                return Err(ValidationError::Missing {
                    field: "test_points".to_string(),
                });
            }
            for (i, test) in test_points.iter().enumerate() {
                let ctx = format!("test_points[{i}]");
                validate_point(&ctx, &test.point)?;
                optional(
                    &format!("{ctx}.balance_line_flow"),
                    test.balance_line_flow.as_ref(),
                    Quantity::MassFlow,
                )?;
                validate_seal_gas(&ctx, test.seal_gas.as_ref())?;
                validate_upstream(&format!("{ctx}.end_seal_upstream"), test.end_seal_upstream.as_ref())?;
                validate_casing(&ctx, test.casing.as_ref())?;
                validate_oil(&ctx, test.oil.as_ref())?;
            }
        }
        CompressorDef::BackToBack {
            geometry_first,
            geometry_second,
            guarantee_first,
            guarantee_second,
            test_points,
        } => {
            validate_geometry("geometry_first", geometry_first)?;
            validate_geometry("geometry_second", geometry_second)?;
            validate_point("guarantee_first", guarantee_first)?;
            validate_point("guarantee_second", guarantee_second)?;
            if test_points.is_empty() {
                return Err(ValidationError::Missing {
                    field: "test_points".to_string(),
                });
            }
            for (i, test) in test_points.iter().enumerate() {
                let first = format!("test_points[{i}].first");
                validate_point(&first, &test.first.point)?;
                validate_seal_gas(&first, test.first.seal_gas.as_ref())?;
                optional(
                    &format!("{first}.division_wall_flow"),
                    test.first.division_wall_flow.as_ref(),
                    Quantity::MassFlow,
                )?;
                optional(
                    &format!("{first}.first_section_discharge_flow"),
                    test.first.first_section_discharge_flow.as_ref(),
                    Quantity::MassFlow,
                )?;
                validate_casing(&first, test.first.casing.as_ref())?;
                validate_oil(&first, test.first.oil.as_ref())?;

                let second = format!("test_points[{i}].second");
                validate_point(&second, &test.second.point)?;
                optional(
                    &format!("{second}.balance_line_flow"),
                    test.second.balance_line_flow.as_ref(),
                    Quantity::MassFlow,
                )?;
                validate_upstream(
                    &format!("{second}.end_seal_upstream"),
                    test.second.end_seal_upstream.as_ref(),
                )?;
                validate_upstream(
                    &format!("{second}.division_wall_upstream"),
                    test.second.division_wall_upstream.as_ref(),
                )?;
                validate_casing(&second, test.second.casing.as_ref())?;
            }
        }
    }

    Ok(())
}

fn validate_geometry(ctx: &str, geometry: &GeometryDef) -> Result<(), ValidationError> {
    positive(&format!("{ctx}.b"), &geometry.b, Quantity::Length)?;
    positive(&format!("{ctx}.d"), &geometry.d, Quantity::Length)?;
    if let Some(r) = &geometry.surface_roughness {
        let value = parse_field(&format!("{ctx}.surface_roughness"), r, Quantity::Length)?;
        if value < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("{ctx}.surface_roughness"),
                value: r.clone(),
                reason: "must not be negative".to_string(),
            });
        }
    }
    Ok(())
}

/// Units and ranges of a point. Which inputs close the point is checked
/// when it is built.
fn validate_point(ctx: &str, point: &PointDef) -> Result<(), ValidationError> {
    positive(
        &format!("{ctx}.suction_pressure"),
        &point.suction_pressure,
        Quantity::Pressure,
    )?;
    positive(
        &format!("{ctx}.suction_temperature"),
        &point.suction_temperature,
        Quantity::Temperature,
    )?;
    optional(
        &format!("{ctx}.discharge_pressure"),
        point.discharge_pressure.as_ref(),
        Quantity::Pressure,
    )?;
    optional(
        &format!("{ctx}.discharge_temperature"),
        point.discharge_temperature.as_ref(),
        Quantity::Temperature,
    )?;
    if point.discharge_temperature.is_some() && point.discharge_pressure.is_none() {
        return Err(ValidationError::Missing {
            field: format!("{ctx}.discharge_pressure"),
        });
    }

    if let Some(raw) = &point.eff {
        let eff = parse_field(&format!("{ctx}.eff"), raw, Quantity::Dimensionless)?;
        if !(eff > 0.0 && eff <= 1.0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{ctx}.eff"),
                value: raw.clone(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
    }
    optional(&format!("{ctx}.head"), point.head.as_ref(), Quantity::SpecificEnthalpy)?;
    if let Some(vr) = point.volume_ratio {
        if !(vr > 1.0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{ctx}.volume_ratio"),
                value: vr.to_string(),
                reason: "must be above 1".to_string(),
            });
        }
    }

    match (&point.mass_flow, &point.volume_flow) {
        (Some(m), None) => {
            positive(&format!("{ctx}.mass_flow"), m, Quantity::MassFlow)?;
        }
        (None, Some(q)) => {
            positive(&format!("{ctx}.volume_flow"), q, Quantity::VolumeFlow)?;
        }
        (Some(m), Some(_)) => {
            return Err(ValidationError::InvalidValue {
                field: format!("{ctx}.mass_flow"),
                value: m.clone(),
                reason: "give either mass_flow or volume_flow, not both".to_string(),
            });
        }
        (None, None) => {
            return Err(ValidationError::Missing {
                field: format!("{ctx}.mass_flow"),
            });
        }
    }

    positive(&format!("{ctx}.speed"), &point.speed, Quantity::AngularSpeed)?;
    Ok(())
}

fn validate_seal_gas(ctx: &str, seal_gas: Option<&SealGasDef>) -> Result<(), ValidationError> {
    if let Some(sg) = seal_gas {
        positive(&format!("{ctx}.seal_gas.flow"), &sg.flow, Quantity::MassFlow)?;
        positive(
            &format!("{ctx}.seal_gas.temperature"),
            &sg.temperature,
            Quantity::Temperature,
        )?;
    }
    Ok(())
}

fn validate_upstream(field: &str, upstream: Option<&UpstreamDef>) -> Result<(), ValidationError> {
    if let Some(up) = upstream {
        positive(&format!("{field}.pressure"), &up.pressure, Quantity::Pressure)?;
        positive(
            &format!("{field}.temperature"),
            &up.temperature,
            Quantity::Temperature,
        )?;
    }
    Ok(())
}

fn validate_casing(ctx: &str, casing: Option<&CasingDef>) -> Result<(), ValidationError> {
    if let Some(c) = casing {
        positive(&format!("{ctx}.casing.area"), &c.area, Quantity::Area)?;
        positive(
            &format!("{ctx}.casing.temperature"),
            &c.temperature,
            Quantity::Temperature,
        )?;
        positive(
            &format!("{ctx}.casing.ambient_temperature"),
            &c.ambient_temperature,
            Quantity::Temperature,
        )?;
    }
    Ok(())
}

fn validate_oil_stream(field: &str, stream: Option<&OilStreamDef>) -> Result<(), ValidationError> {
    if let Some(s) = stream {
        positive(&format!("{field}.flow"), &s.flow, Quantity::VolumeFlow)?;
        positive(
            &format!("{field}.outlet_temperature"),
            &s.outlet_temperature,
            Quantity::Temperature,
        )?;
    }
    Ok(())
}

fn validate_oil(ctx: &str, oil: Option<&OilDef>) -> Result<(), ValidationError> {
    let Some(oil) = oil else {
        return Ok(());
    };
    positive(
        &format!("{ctx}.oil.inlet_temperature"),
        &oil.inlet_temperature,
        Quantity::Temperature,
    )?;
    validate_oil_stream(&format!("{ctx}.oil.journal_de"), oil.journal_de.as_ref())?;
    validate_oil_stream(&format!("{ctx}.oil.journal_nde"), oil.journal_nde.as_ref())?;
    validate_oil_stream(&format!("{ctx}.oil.thrust"), oil.thrust.as_ref())?;
    if oil.journal_de.is_none() && oil.journal_nde.is_none() && oil.thrust.is_none() {
        return Err(ValidationError::Missing {
            field: format!("{ctx}.oil.journal_de"),
        });
    }
    if let OilPropertiesDef::Fixed { density, cp } = &oil.properties {
        positive(&format!("{ctx}.oil.properties.density"), density, Quantity::Density)?;
        positive(&format!("{ctx}.oil.properties.cp"), cp, Quantity::SpecificEntropy)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> PointDef {
        PointDef {
            suction_pressure: "1.826 bar".to_string(),
            suction_temperature: "296.7 K".to_string(),
            discharge_pressure: Some("6.142 bar".to_string()),
            discharge_temperature: Some("392.1 K".to_string()),
            mass_flow: Some("7.737 kg/s".to_string()),
            speed: "7894 rpm".to_string(),
            ..PointDef::default()
        }
    }

    #[test]
    fn complete_point_is_valid() {
        validate_point("p", &point()).unwrap();
    }

    #[test]
    fn bad_unit_names_the_field() {
        let p = PointDef {
            suction_pressure: "1.826 psi".to_string(),
            ..point()
        };
        match validate_point("guarantee", &p).unwrap_err() {
            ValidationError::InvalidValue { field, .. } => {
                assert_eq!(field, "guarantee.suction_pressure")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn exactly_one_flow_is_required() {
        let none = PointDef {
            mass_flow: None,
            ..point()
        };
        assert!(matches!(
            validate_point("p", &none),
            Err(ValidationError::Missing { .. })
        ));
        let both = PointDef {
            volume_flow: Some("3 m3/s".to_string()),
            ..point()
        };
        assert!(validate_point("p", &both).is_err());
    }

    #[test]
    fn efficiency_accepts_percent() {
        let p = PointDef {
            discharge_temperature: None,
            eff: Some("73.5%".to_string()),
            ..point()
        };
        validate_point("p", &p).unwrap();
        let p = PointDef {
            eff: Some("1.2".to_string()),
            ..point()
        };
        assert!(validate_point("p", &p).is_err());
    }

    #[test]
    fn discharge_temperature_needs_pressure() {
        let p = PointDef {
            discharge_pressure: None,
            ..point()
        };
        assert!(matches!(
            validate_point("p", &p),
            Err(ValidationError::Missing { field }) if field == "p.discharge_pressure"
        ));
    }

    #[test]
    fn oil_needs_a_stream() {
        let oil = OilDef {
            inlet_temperature: "45 degC".to_string(),
            journal_de: None,
            journal_nde: None,
            thrust: None,
            properties: OilPropertiesDef::default(),
        };
        assert!(validate_oil("t", Some(&oil)).is_err());
    }
}
