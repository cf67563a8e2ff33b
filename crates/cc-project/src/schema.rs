//! Project schema definitions.
//!
//! Physical values are unit-tagged text ("1.826 bar", "7894 rpm") and are
//! only converted to SI when the project is rebuilt.

use cc_point::{PolytropicMethod, ReynoldsCorrection};
use serde::{Deserialize, Serialize};

/// Value of the `format` tag of every project document.
pub const FORMAT: &str = "ccperf-project";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default)]
    pub format: String,
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fluid: FluidDef,
    #[serde(default)]
    pub method: PolytropicMethodDef,
    #[serde(default)]
    pub corrections: CorrectionsDef,
    pub compressor: CompressorDef,
    /// Operating speed; the guarantee speed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    #[serde(default)]
    pub backend: FluidBackendDef,
    pub composition: CompositionDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FluidBackendDef {
    #[default]
    PengRobinson,
    CoolProp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CompositionDef {
    Pure { species: String },
    Mixture { fractions: Vec<(String, f64)> },
}

impl CompositionDef {
    /// Names and fractions as written in the document.
    pub fn fractions(&self) -> Vec<(String, f64)> {
        match self {
            CompositionDef::Pure { species } => vec![(species.clone(), 1.0)],
            CompositionDef::Mixture { fractions } => fractions.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolytropicMethodDef {
    #[default]
    Schultz,
    Huntington,
    MallenSaville,
    SandbergColby,
    SandbergColbyMultistep,
}

impl From<PolytropicMethodDef> for PolytropicMethod {
    fn from(def: PolytropicMethodDef) -> Self {
        match def {
            PolytropicMethodDef::Schultz => PolytropicMethod::Schultz,
            PolytropicMethodDef::Huntington => PolytropicMethod::Huntington,
            PolytropicMethodDef::MallenSaville => PolytropicMethod::MallenSaville,
            PolytropicMethodDef::SandbergColby => PolytropicMethod::SandbergColby,
            PolytropicMethodDef::SandbergColbyMultistep => PolytropicMethod::SandbergColbyMultistep,
        }
    }
}

impl From<PolytropicMethod> for PolytropicMethodDef {
    fn from(method: PolytropicMethod) -> Self {
        match method {
            PolytropicMethod::Schultz => PolytropicMethodDef::Schultz,
            PolytropicMethod::Huntington => PolytropicMethodDef::Huntington,
            PolytropicMethod::MallenSaville => PolytropicMethodDef::MallenSaville,
            PolytropicMethod::SandbergColby => PolytropicMethodDef::SandbergColby,
            PolytropicMethod::SandbergColbyMultistep => PolytropicMethodDef::SandbergColbyMultistep,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReynoldsCorrectionDef {
    #[default]
    None,
    Ptc1997,
}

impl From<ReynoldsCorrectionDef> for ReynoldsCorrection {
    fn from(def: ReynoldsCorrectionDef) -> Self {
        match def {
            ReynoldsCorrectionDef::None => ReynoldsCorrection::None,
            ReynoldsCorrectionDef::Ptc1997 => ReynoldsCorrection::Ptc1997,
        }
    }
}

/// Which test-to-guarantee corrections are applied. All off by default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CorrectionsDef {
    #[serde(default)]
    pub reynolds: ReynoldsCorrectionDef,
    #[serde(default)]
    pub bearing_mechanical_losses: bool,
    #[serde(default)]
    pub casing_heat_loss: bool,
    #[serde(default)]
    pub leakages: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeometryDef {
    /// Impeller outlet width
    pub b: String,
    /// Impeller outer diameter
    pub d: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_roughness: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CompressorDef {
    StraightThrough {
        geometry: GeometryDef,
        guarantee: PointDef,
        test_points: Vec<StraightThroughTestDef>,
    },
    BackToBack {
        geometry_first: GeometryDef,
        geometry_second: GeometryDef,
        guarantee_first: PointDef,
        guarantee_second: PointDef,
        test_points: Vec<BackToBackTestDef>,
    },
}

impl CompressorDef {
    pub fn test_point_count(&self) -> usize {
        match self {
            CompressorDef::StraightThrough { test_points, .. } => test_points.len(),
            CompressorDef::BackToBack { test_points, .. } => test_points.len(),
        }
    }
}

/// Raw operating-point inputs. Which optional fields are present decides
/// how the point is closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PointDef {
    pub suction_pressure: String,
    pub suction_temperature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_flow: Option<String>,
    pub speed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SealGasDef {
    pub flow: String,
    pub temperature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpstreamDef {
    pub pressure: String,
    pub temperature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CasingDef {
    pub area: String,
    pub temperature: String,
    pub ambient_temperature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OilStreamDef {
    pub flow: String,
    pub outlet_temperature: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IsoVgDef {
    #[default]
    Vg32,
    Vg46,
    Vg68,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OilPropertiesDef {
    Iso { grade: IsoVgDef },
    Fixed { density: String, cp: String },
}

impl Default for OilPropertiesDef {
    fn default() -> Self {
        OilPropertiesDef::Iso {
            grade: IsoVgDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OilDef {
    pub inlet_temperature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_de: Option<OilStreamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_nde: Option<OilStreamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thrust: Option<OilStreamDef>,
    #[serde(default)]
    pub properties: OilPropertiesDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StraightThroughTestDef {
    #[serde(flatten)]
    pub point: PointDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_line_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_gas: Option<SealGasDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_seal_upstream: Option<UpstreamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casing: Option<CasingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil: Option<OilDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirstSectionTestDef {
    #[serde(flatten)]
    pub point: PointDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_gas: Option<SealGasDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_wall_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_section_discharge_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casing: Option<CasingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil: Option<OilDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecondSectionTestDef {
    #[serde(flatten)]
    pub point: PointDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_line_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_seal_upstream: Option<UpstreamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_wall_upstream: Option<UpstreamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casing: Option<CasingDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackToBackTestDef {
    pub first: FirstSectionTestDef,
    pub second: SecondSectionTestDef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_defs_map_both_ways() {
        for method in PolytropicMethod::ALL {
            let def = PolytropicMethodDef::from(method);
            assert_eq!(PolytropicMethod::from(def), method);
        }
    }

    #[test]
    fn method_def_uses_engine_keys() {
        for method in PolytropicMethod::ALL {
            let yaml = serde_yaml::to_string(&PolytropicMethodDef::from(method)).unwrap();
            assert_eq!(yaml.trim(), method.key());
        }
    }

    #[test]
    fn flattened_test_point_reads_plain_fields() {
        let yaml = r#"
suction_pressure: 1.826 bar
suction_temperature: 296.7 K
discharge_pressure: 6.142 bar
discharge_temperature: 392.1 K
mass_flow: 7.737 kg/s
speed: 7894 rpm
balance_line_flow: 0.1076 kg/s
seal_gas:
  flow: 0.04982 kg/s
  temperature: 297.7 K
"#;
        let test: StraightThroughTestDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(test.point.discharge_pressure.as_deref(), Some("6.142 bar"));
        assert_eq!(test.balance_line_flow.as_deref(), Some("0.1076 kg/s"));
        assert!(test.casing.is_none());
        assert_eq!(test.seal_gas.unwrap().temperature, "297.7 K");
    }

    #[test]
    fn corrections_default_to_off() {
        let corrections: CorrectionsDef = serde_yaml::from_str("{}").unwrap();
        assert_eq!(corrections, CorrectionsDef::default());
        assert_eq!(corrections.reynolds, ReynoldsCorrectionDef::None);
        assert!(!corrections.leakages);
    }
}
