//! Unit-tagged numeric input.
//!
//! Data sheets and project files carry values as text with a unit tag
//! ("1.826 bar", "23.55 degC", "11145 rpm"). [`parse_quantity`] converts such
//! text to the canonical SI value for the given [`Quantity`];
//! [`format_quantity`] writes an SI value back with the canonical unit.

use std::fmt;

/// Dimension/quantity family for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Temperature (canonical: K)
    Temperature,
    /// Temperature difference (canonical: K)
    TemperatureDifference,
    /// Absolute pressure (canonical: Pa)
    Pressure,
    /// Density (canonical: kg/m³)
    Density,
    /// Specific enthalpy (canonical: J/kg)
    SpecificEnthalpy,
    /// Specific entropy / specific heat (canonical: J/(kg·K))
    SpecificEntropy,
    /// Dimensionless (canonical: as-is, but may include %)
    Dimensionless,
    /// Length (canonical: m)
    Length,
    /// Area (canonical: m²)
    Area,
    /// Mass flow (canonical: kg/s)
    MassFlow,
    /// Volume flow (canonical: m³/s)
    VolumeFlow,
    /// Rotational speed (canonical: rad/s)
    AngularSpeed,
    /// Power (canonical: W)
    Power,
}

impl Quantity {
    /// Unit written by [`format_quantity`].
    pub fn canonical_unit(&self) -> &'static str {
        match self {
            Self::Temperature | Self::TemperatureDifference => "K",
            Self::Pressure => "Pa",
            Self::Density => "kg/m3",
            Self::SpecificEnthalpy => "J/kg",
            Self::SpecificEntropy => "J/(kg*K)",
            Self::Dimensionless => "",
            Self::Length => "m",
            Self::Area => "m2",
            Self::MassFlow => "kg/s",
            Self::VolumeFlow => "m3/s",
            Self::AngularSpeed => "rad/s",
            Self::Power => "W",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Temperature => "Temperature",
            Self::TemperatureDifference => "Temperature Difference",
            Self::Pressure => "Absolute Pressure",
            Self::Density => "Density",
            Self::SpecificEnthalpy => "Specific Enthalpy",
            Self::SpecificEntropy => "Specific Entropy",
            Self::Dimensionless => "Dimensionless",
            Self::Length => "Length",
            Self::Area => "Area",
            Self::MassFlow => "Mass Flow",
            Self::VolumeFlow => "Volume Flow",
            Self::AngularSpeed => "Rotational Speed",
            Self::Power => "Power",
        };
        f.write_str(name)
    }
}

/// Error in unit parsing or conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitError {
    /// Input text did not parse to a number + optional unit
    ParseError(String),
    /// Unit not recognized for this quantity
    UnknownUnit { unit: String, quantity: String },
    /// Unit not allowed for this quantity (e.g., plain "psi" requires "psia" or "psig")
    AmbiguousUnit { unit: String, reason: String },
    /// Value out of physical range (e.g., negative absolute temperature)
    OutOfRange { value: f64, reason: String },
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::UnknownUnit { unit, quantity } => {
                write!(f, "Unknown unit '{}' for {}", unit, quantity)
            }
            Self::AmbiguousUnit { unit, reason } => {
                write!(f, "Ambiguous unit '{}': {}", unit, reason)
            }
            Self::OutOfRange { value, reason } => {
                write!(f, "Value {} out of range: {}", value, reason)
            }
        }
    }
}

impl std::error::Error for UnitError {}

/// Parse a quantity value from text and convert it to canonical SI units.
///
/// A bare number is taken to be in the canonical unit.
pub fn parse_quantity(raw_text: &str, quantity: Quantity) -> Result<f64, UnitError> {
    let trimmed = raw_text.trim();

    match quantity {
        Quantity::Temperature => parse_temperature(trimmed),
        Quantity::TemperatureDifference => parse_temperature_difference(trimmed),
        Quantity::Pressure => parse_pressure(trimmed),
        Quantity::Density => parse_density(trimmed),
        Quantity::SpecificEnthalpy => parse_specific_enthalpy(trimmed),
        Quantity::SpecificEntropy => parse_specific_entropy(trimmed),
        Quantity::Dimensionless => parse_dimensionless(trimmed),
        Quantity::Length => parse_length(trimmed),
        Quantity::Area => parse_area(trimmed),
        Quantity::MassFlow => parse_mass_flow(trimmed),
        Quantity::VolumeFlow => parse_volume_flow(trimmed),
        Quantity::AngularSpeed => parse_angular_speed(trimmed),
        Quantity::Power => parse_power(trimmed),
    }
}

/// Write an SI value with the canonical unit of `quantity`.
pub fn format_quantity(value: f64, quantity: Quantity) -> String {
    match quantity.canonical_unit() {
        "" => format!("{value}"),
        unit => format!("{value} {unit}"),
    }
}

fn unknown(unit: &str, quantity: Quantity) -> UnitError {
    UnitError::UnknownUnit {
        unit: unit.to_string(),
        quantity: quantity.to_string(),
    }
}

fn require_positive(value: f64, reason: &str) -> Result<f64, UnitError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(UnitError::OutOfRange {
            value,
            reason: reason.to_string(),
        })
    }
}

/// Parse temperature in various units, return Kelvin.
fn parse_temperature(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let kelvin = match unit.to_lowercase().as_str() {
        "k" | "kelvin" | "" => value,
        "c" | "°c" | "degc" | "celsius" => value + 273.15,
        "f" | "°f" | "degf" | "fahrenheit" => (value + 459.67) * 5.0 / 9.0,
        "r" | "°r" | "degr" | "rankine" => value * 5.0 / 9.0,
        _ => return Err(unknown(&unit, Quantity::Temperature)),
    };

    require_positive(kelvin, "Absolute temperature must be > 0 K")
}

/// Parse a temperature difference, return K.
fn parse_temperature_difference(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    match unit.to_lowercase().as_str() {
        "k" | "c" | "°c" | "degc" | "delta_degc" | "" => Ok(value),
        "f" | "°f" | "degf" | "delta_degf" | "r" => Ok(value * 5.0 / 9.0),
        _ => Err(unknown(&unit, Quantity::TemperatureDifference)),
    }
}

/// Parse pressure in various units, return Pa (absolute).
fn parse_pressure(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let pa = match unit.to_lowercase().as_str() {
        "pa" | "pascal" | "" => value,
        "kpa" => value * 1e3,
        "mpa" => value * 1e6,
        "bar" => value * 1e5,
        "mbar" | "millibar" => value * 100.0,
        "atm" => value * 101_325.0,
        "psia" => value * 6_894.76,
        "psig" => (value + 14.696) * 6_894.76,
        "barg" => (value + 1.013_25) * 1e5,
        "kgf/cm2" | "kgf/cm²" => value * 98_066.5,
        "psi" => {
            return Err(UnitError::AmbiguousUnit {
                unit: "psi".to_string(),
                reason: "Use 'psia' (absolute) or 'psig' (gauge)".to_string(),
            });
        }
        _ => return Err(unknown(&unit, Quantity::Pressure)),
    };

    require_positive(pa, "Absolute pressure must be positive")
}

/// Parse density in various units, return kg/m³.
fn parse_density(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let kg_m3 = match unit.to_lowercase().as_str() {
        "kg/m^3" | "kg/m³" | "kg/m3" | "" => value,
        "g/cm^3" | "g/cm³" | "g/cm3" => value * 1e3,
        "lbm/ft^3" | "lbm/ft3" | "lb/ft3" => value * 16.018_46,
        _ => return Err(unknown(&unit, Quantity::Density)),
    };

    require_positive(kg_m3, "Density must be positive")
}

/// Parse specific enthalpy in various units, return J/kg.
fn parse_specific_enthalpy(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    match unit.to_lowercase().as_str() {
        "j/kg" | "" => Ok(value),
        "kj/kg" => Ok(value * 1e3),
        "btu/lbm" | "btu/lb" => Ok(value * 2_326.0),
        _ => Err(unknown(&unit, Quantity::SpecificEnthalpy)),
    }
}

/// Parse specific entropy/specific heat, return J/(kg·K).
fn parse_specific_entropy(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    match unit.to_lowercase().as_str() {
        "j/(kg·k)" | "j/(kg k)" | "j/(kg*k)" | "j/kg/k" | "" => Ok(value),
        "kj/(kg·k)" | "kj/(kg k)" | "kj/(kg*k)" | "kj/kg/k" => Ok(value * 1e3),
        "btu/(lbm·r)" | "btu/(lbm r)" | "btu/(lbm*r)" => Ok(value * 4_186.8),
        _ => Err(unknown(&unit, Quantity::SpecificEntropy)),
    }
}

/// Parse dimensionless, accepting plain numbers or percent.
fn parse_dimensionless(input: &str) -> Result<f64, UnitError> {
    let trimmed = input.trim();
    let parse = |s: &str| {
        s.trim().parse::<f64>().map_err(|_| {
            UnitError::ParseError(format!(
                "Could not parse dimensionless value from '{}'",
                input
            ))
        })
    };
    match trimmed.strip_suffix('%') {
        Some(num) => Ok(parse(num)? / 100.0),
        None => parse(trimmed),
    }
}

/// Parse length in various units, return m.
fn parse_length(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let m = match unit.to_lowercase().as_str() {
        "m" | "" => value,
        "cm" => value * 1e-2,
        "mm" => value * 1e-3,
        "um" | "µm" | "micron" => value * 1e-6,
        "in" | "inch" => value * 0.0254,
        "ft" => value * 0.3048,
        _ => return Err(unknown(&unit, Quantity::Length)),
    };

    if m < 0.0 {
        return Err(UnitError::OutOfRange {
            value: m,
            reason: "Length cannot be negative".to_string(),
        });
    }
    Ok(m)
}

/// Parse area, return m².
fn parse_area(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let m2 = match unit.to_lowercase().as_str() {
        "m2" | "m^2" | "m²" | "" => value,
        "cm2" | "cm^2" => value * 1e-4,
        "mm2" | "mm^2" => value * 1e-6,
        "ft2" | "ft^2" => value * 0.092_903_04,
        _ => return Err(unknown(&unit, Quantity::Area)),
    };

    if m2 < 0.0 {
        return Err(UnitError::OutOfRange {
            value: m2,
            reason: "Area cannot be negative".to_string(),
        });
    }
    Ok(m2)
}

/// Parse mass flow, return kg/s.
fn parse_mass_flow(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let kg_s = match unit.to_lowercase().as_str() {
        "kg/s" | "" => value,
        "kg/min" => value / 60.0,
        "kg/h" | "kg/hr" => value / 3600.0,
        "t/h" => value / 3.6,
        "lbm/s" | "lb/s" => value * 0.453_592_37,
        "lbm/min" | "lb/min" => value * 0.453_592_37 / 60.0,
        "lbm/h" | "lb/h" => value * 0.453_592_37 / 3600.0,
        _ => return Err(unknown(&unit, Quantity::MassFlow)),
    };

    if kg_s < 0.0 {
        return Err(UnitError::OutOfRange {
            value: kg_s,
            reason: "Mass flow cannot be negative".to_string(),
        });
    }
    Ok(kg_s)
}

/// Parse volume flow, return m³/s.
fn parse_volume_flow(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let m3_s = match unit.to_lowercase().as_str() {
        "m3/s" | "m^3/s" | "m³/s" | "" => value,
        "m3/min" | "m^3/min" | "m³/min" => value / 60.0,
        "m3/h" | "m^3/h" | "m³/h" => value / 3600.0,
        "ft3/min" | "cfm" | "acfm" => value * 0.028_316_846_592 / 60.0,
        _ => return Err(unknown(&unit, Quantity::VolumeFlow)),
    };

    if m3_s < 0.0 {
        return Err(UnitError::OutOfRange {
            value: m3_s,
            reason: "Volume flow cannot be negative".to_string(),
        });
    }
    Ok(m3_s)
}

/// Parse rotational speed, return rad/s.
fn parse_angular_speed(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    let rad_s = match unit.to_lowercase().as_str() {
        "rad/s" | "" => value,
        "rpm" | "rev/min" | "1/min" => value * std::f64::consts::PI / 30.0,
        "hz" | "rev/s" => value * 2.0 * std::f64::consts::PI,
        _ => return Err(unknown(&unit, Quantity::AngularSpeed)),
    };

    if rad_s < 0.0 {
        return Err(UnitError::OutOfRange {
            value: rad_s,
            reason: "Speed cannot be negative".to_string(),
        });
    }
    Ok(rad_s)
}

/// Parse power, return W.
fn parse_power(input: &str) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(input)?;

    match unit.to_lowercase().as_str() {
        "w" | "" => Ok(value),
        "kw" => Ok(value * 1e3),
        "mw" => Ok(value * 1e6),
        "hp" => Ok(value * 745.699_872),
        _ => Err(unknown(&unit, Quantity::Power)),
    }
}

/// Split a value+unit string into (numeric_value, unit_string).
///
/// Examples:
/// - "70F" -> (70.0, "F")
/// - "14.7 psia" -> (14.7, "psia")
/// - "1.2e5 Pa" -> (120000.0, "Pa")
/// - "300" -> (300.0, "")
fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();

    // An 'e' only belongs to the number when it is an exponent marker.
    let bytes = trimmed.as_bytes();
    let mut split_idx = trimmed.len();
    for (i, c) in trimmed.char_indices() {
        let exponent = (c == 'e' || c == 'E')
            && i > 0
            && bytes[i - 1].is_ascii_digit()
            && bytes
                .get(i + 1)
                .is_some_and(|b| b.is_ascii_digit() || *b == b'-' || *b == b'+');
        let sign_after_exponent =
            (c == '-' || c == '+') && i > 0 && matches!(bytes[i - 1], b'e' | b'E');
        let numeric = c.is_ascii_digit()
            || c == '.'
            || ((c == '-' || c == '+') && i == 0)
            || exponent
            || sign_after_exponent;
        if !numeric {
            split_idx = i;
            break;
        }
    }

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let value: f64 = num_part.trim().parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{}'", input))
    })?;

    Ok((value, unit_part.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_temperatures() {
        assert_eq!(parse_temperature("300 K").unwrap(), 300.0);
        assert_eq!(parse_temperature("300K").unwrap(), 300.0);
        assert!((parse_temperature("23.55 degC").unwrap() - 296.7).abs() < 1e-9);
        assert!((parse_temperature("32F").unwrap() - 273.15).abs() < 0.01);
        assert!(parse_temperature("-100K").is_err());
    }

    #[test]
    fn parse_pressures() {
        assert_eq!(parse_pressure("101325 Pa").unwrap(), 101325.0);
        assert!((parse_pressure("1.826 bar").unwrap() - 182_600.0).abs() < 1e-6);
        assert_eq!(parse_pressure("1.2e5").unwrap(), 1.2e5);
        assert!(matches!(
            parse_pressure("14.7 psi"),
            Err(UnitError::AmbiguousUnit { unit, .. }) if unit == "psi"
        ));
    }

    #[test]
    fn exponent_is_not_mistaken_for_a_unit() {
        assert_eq!(split_value_and_unit("3e-3 m").unwrap(), (3e-3, "m".to_string()));
        assert_eq!(split_value_and_unit("5 m").unwrap(), (5.0, "m".to_string()));
    }

    #[test]
    fn parse_machine_quantities() {
        let n = parse_quantity("11145 rpm", Quantity::AngularSpeed).unwrap();
        assert!((n - 1167.1).abs() < 0.1);
        assert!((parse_quantity("365 mm", Quantity::Length).unwrap() - 0.365).abs() < 1e-12);
        assert!((parse_quantity("3600 kg/h", Quantity::MassFlow).unwrap() - 1.0).abs() < 1e-12);
        assert!((parse_quantity("7200 m3/h", Quantity::VolumeFlow).unwrap() - 2.0).abs() < 1e-12);
        assert!((parse_quantity("5.5 m2", Quantity::Area).unwrap() - 5.5).abs() < 1e-12);
        assert_eq!(parse_quantity("2 kW", Quantity::Power).unwrap(), 2000.0);
    }

    #[test]
    fn unknown_unit_names_quantity() {
        let err = parse_quantity("3 furlong", Quantity::Length).unwrap_err();
        assert_eq!(
            err,
            UnitError::UnknownUnit {
                unit: "furlong".to_string(),
                quantity: "Length".to_string()
            }
        );
    }

    #[test]
    fn parse_dimensionless_percent() {
        assert_eq!(parse_dimensionless("0.75").unwrap(), 0.75);
        assert_eq!(parse_dimensionless("75%").unwrap(), 0.75);
    }

    #[test]
    fn format_then_parse_is_stable() {
        for (v, q) in [
            (182_600.0, Quantity::Pressure),
            (296.7, Quantity::Temperature),
            (1167.1, Quantity::AngularSpeed),
            (0.5, Quantity::Dimensionless),
        ] {
            let text = format_quantity(v, q);
            assert_eq!(parse_quantity(&text, q).unwrap(), v, "{text}");
        }
    }
}
