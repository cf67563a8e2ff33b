//! Chemical species definitions.

/// Pure-component constants used by the cubic equation of state and the
/// dilute-gas viscosity correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesConstants {
    /// Molar mass [kg/kmol]
    pub molar_mass: f64,
    /// Critical temperature [K]
    pub tc: f64,
    /// Critical pressure [Pa]
    pub pc: f64,
    /// Acentric factor [-]
    pub omega: f64,
    /// Critical molar volume [cm³/mol]
    pub vc: f64,
    /// Dipole moment [debye]
    pub dipole: f64,
    /// Ideal-gas heat capacity polynomial, cp/R = a0 + a1 T + a2 T² + a3 T³ + a4 T⁴ (T in K)
    pub cp_r: [f64; 5],
}

/// Species found in compressor test and process gases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Oxygen (O₂)
    O2,
    /// Nitrogen (N₂)
    N2,
    /// Argon (Ar)
    Ar,
    /// Helium (He)
    He,
    /// Hydrogen (H₂)
    H2,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Carbon monoxide (CO)
    CO,
    /// Water (H₂O)
    H2O,
    /// Hydrogen sulfide (H₂S)
    H2S,
    /// Methane (CH₄)
    CH4,
    /// Ethane
    Ethane,
    /// Propane
    Propane,
    /// n-Butane
    NButane,
    /// Isobutane
    Isobutane,
    /// Refrigerant R134a
    R134a,
}

impl Species {
    pub const ALL: [Species; 15] = [
        Species::O2,
        Species::N2,
        Species::Ar,
        Species::He,
        Species::H2,
        Species::CO2,
        Species::CO,
        Species::H2O,
        Species::H2S,
        Species::CH4,
        Species::Ethane,
        Species::Propane,
        Species::NButane,
        Species::Isobutane,
        Species::R134a,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::O2 => "O2",
            Species::N2 => "N2",
            Species::Ar => "Ar",
            Species::He => "He",
            Species::H2 => "H2",
            Species::CO2 => "CO2",
            Species::CO => "CO",
            Species::H2O => "H2O",
            Species::H2S => "H2S",
            Species::CH4 => "CH4",
            Species::Ethane => "Ethane",
            Species::Propane => "Propane",
            Species::NButane => "nButane",
            Species::Isobutane => "Isobutane",
            Species::R134a => "R134a",
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "O2" | "OXYGEN" => Ok(Species::O2),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "AR" | "ARGON" => Ok(Species::Ar),
            "HE" | "HELIUM" => Ok(Species::He),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "CO" | "CARBONMONOXIDE" | "CARBON MONOXIDE" => Ok(Species::CO),
            "H2O" | "WATER" => Ok(Species::H2O),
            "H2S" | "HYDROGENSULFIDE" | "HYDROGEN SULFIDE" => Ok(Species::H2S),
            "CH4" | "METHANE" => Ok(Species::CH4),
            "ETHANE" | "C2H6" => Ok(Species::Ethane),
            "PROPANE" | "C3H8" | "N-PROPANE" => Ok(Species::Propane),
            "NBUTANE" | "N-BUTANE" | "BUTANE" => Ok(Species::NButane),
            "ISOBUTANE" | "I-BUTANE" | "IBUTANE" => Ok(Species::Isobutane),
            "R134A" => Ok(Species::R134a),
            _ => Err("unknown species"),
        }
    }
}

impl Species {
    /// Get CoolProp fluid name for this species.
    pub fn coolprop_name(&self) -> &'static str {
        match self {
            Species::O2 => "Oxygen",
            Species::N2 => "Nitrogen",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::H2 => "Hydrogen",
            Species::CO2 => "CarbonDioxide",
            Species::CO => "CarbonMonoxide",
            Species::H2O => "Water",
            Species::H2S => "HydrogenSulfide",
            Species::CH4 => "Methane",
            Species::Ethane => "Ethane",
            Species::Propane => "n-Propane",
            Species::NButane => "n-Butane",
            Species::Isobutane => "Isobutane",
            Species::R134a => "R134a",
        }
    }

    /// Map to rfluids Pure enum (internal use for CoolProp backend).
    pub(crate) fn rfluids_pure(&self) -> rfluids::substance::Pure {
        use rfluids::substance::Pure;
        match self {
            Species::O2 => Pure::Oxygen,
            Species::N2 => Pure::Nitrogen,
            Species::Ar => Pure::Argon,
            Species::He => Pure::Helium,
            Species::H2 => Pure::Hydrogen,
            Species::CO2 => Pure::CarbonDioxide,
            Species::CO => Pure::CarbonMonoxide,
            Species::H2O => Pure::Water,
            Species::H2S => Pure::HydrogenSulfide,
            Species::CH4 => Pure::Methane,
            Species::Ethane => Pure::Ethane,
            Species::Propane => Pure::nPropane,
            Species::NButane => Pure::nButane,
            Species::Isobutane => Pure::Isobutane,
            Species::R134a => Pure::R134a,
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::O2 => "Oxygen",
            Species::N2 => "Nitrogen",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::H2 => "Hydrogen",
            Species::CO2 => "Carbon Dioxide",
            Species::CO => "Carbon Monoxide",
            Species::H2O => "Water",
            Species::H2S => "Hydrogen Sulfide",
            Species::CH4 => "Methane",
            Species::Ethane => "Ethane",
            Species::Propane => "Propane",
            Species::NButane => "n-Butane",
            Species::Isobutane => "Isobutane",
            Species::R134a => "R134a",
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    pub fn molar_mass(&self) -> f64 {
        self.constants().molar_mass
    }

    /// Critical constants and ideal-gas heat capacity coefficients.
    ///
    /// Critical data from NIST reference fluid files; cp polynomials from
    /// Poling, Prausnitz & O'Connell (5th ed.) Appendix A, except R134a which
    /// is a fit of the Tillner-Roth & Baehr ideal-gas term over 200-500 K.
    pub fn constants(&self) -> &'static SpeciesConstants {
        match self {
            Species::O2 => &O2,
            Species::N2 => &N2,
            Species::Ar => &AR,
            Species::He => &HE,
            Species::H2 => &H2,
            Species::CO2 => &CO2,
            Species::CO => &CO,
            Species::H2O => &H2O,
            Species::H2S => &H2S,
            Species::CH4 => &CH4,
            Species::Ethane => &ETHANE,
            Species::Propane => &PROPANE,
            Species::NButane => &NBUTANE,
            Species::Isobutane => &ISOBUTANE,
            Species::R134a => &R134A,
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

const O2: SpeciesConstants = SpeciesConstants {
    molar_mass: 31.9988,
    tc: 154.581,
    pc: 5.043e6,
    omega: 0.0222,
    vc: 73.4,
    dipole: 0.0,
    cp_r: [3.630, -1.794e-3, 0.658e-5, -0.601e-8, 0.179e-11],
};

const N2: SpeciesConstants = SpeciesConstants {
    molar_mass: 28.0134,
    tc: 126.192,
    pc: 3.3958e6,
    omega: 0.0372,
    vc: 89.2,
    dipole: 0.0,
    cp_r: [3.539, -0.261e-3, 0.007e-5, 0.157e-8, -0.099e-11],
};

const AR: SpeciesConstants = SpeciesConstants {
    molar_mass: 39.948,
    tc: 150.687,
    pc: 4.863e6,
    omega: -0.00219,
    vc: 74.6,
    dipole: 0.0,
    cp_r: [2.5, 0.0, 0.0, 0.0, 0.0],
};

const HE: SpeciesConstants = SpeciesConstants {
    molar_mass: 4.0026,
    tc: 5.1953,
    pc: 0.22832e6,
    omega: -0.385,
    vc: 57.3,
    dipole: 0.0,
    cp_r: [2.5, 0.0, 0.0, 0.0, 0.0],
};

const H2: SpeciesConstants = SpeciesConstants {
    molar_mass: 2.01588,
    tc: 33.145,
    pc: 1.2964e6,
    omega: -0.219,
    vc: 64.1,
    dipole: 0.0,
    cp_r: [2.883, 3.681e-3, -0.772e-5, 0.692e-8, -0.213e-11],
};

const CO2: SpeciesConstants = SpeciesConstants {
    molar_mass: 44.0098,
    tc: 304.1282,
    pc: 7.3773e6,
    omega: 0.22394,
    vc: 94.07,
    dipole: 0.0,
    cp_r: [3.259, 1.356e-3, 1.502e-5, -2.374e-8, 1.056e-11],
};

const CO: SpeciesConstants = SpeciesConstants {
    molar_mass: 28.0101,
    tc: 132.86,
    pc: 3.494e6,
    omega: 0.0497,
    vc: 93.1,
    dipole: 0.1,
    cp_r: [3.912, -3.913e-3, 1.182e-5, -1.302e-8, 0.515e-11],
};

const H2O: SpeciesConstants = SpeciesConstants {
    molar_mass: 18.0153,
    tc: 647.096,
    pc: 22.064e6,
    omega: 0.3443,
    vc: 55.9,
    dipole: 1.85,
    cp_r: [4.395, -4.186e-3, 1.405e-5, -1.564e-8, 0.632e-11],
};

const H2S: SpeciesConstants = SpeciesConstants {
    molar_mass: 34.081,
    tc: 373.1,
    pc: 8.9999e6,
    omega: 0.1005,
    vc: 98.6,
    dipole: 0.97,
    cp_r: [4.266, -3.438e-3, 1.319e-5, -1.331e-8, 0.488e-11],
};

const CH4: SpeciesConstants = SpeciesConstants {
    molar_mass: 16.0428,
    tc: 190.564,
    pc: 4.5992e6,
    omega: 0.01142,
    vc: 98.6,
    dipole: 0.0,
    cp_r: [4.568, -8.975e-3, 3.631e-5, -3.407e-8, 1.091e-11],
};

const ETHANE: SpeciesConstants = SpeciesConstants {
    molar_mass: 30.069,
    tc: 305.322,
    pc: 4.8722e6,
    omega: 0.0995,
    vc: 145.5,
    dipole: 0.0,
    cp_r: [4.178, -4.427e-3, 5.660e-5, -6.651e-8, 2.487e-11],
};

const PROPANE: SpeciesConstants = SpeciesConstants {
    molar_mass: 44.0956,
    tc: 369.89,
    pc: 4.2512e6,
    omega: 0.1521,
    vc: 200.0,
    dipole: 0.0,
    cp_r: [3.847, 5.131e-3, 6.011e-5, -7.893e-8, 3.079e-11],
};

const NBUTANE: SpeciesConstants = SpeciesConstants {
    molar_mass: 58.1222,
    tc: 425.125,
    pc: 3.796e6,
    omega: 0.201,
    vc: 255.0,
    dipole: 0.0,
    cp_r: [5.547, 5.536e-3, 8.057e-5, -10.571e-8, 4.134e-11],
};

const ISOBUTANE: SpeciesConstants = SpeciesConstants {
    molar_mass: 58.1222,
    tc: 407.81,
    pc: 3.629e6,
    omega: 0.184,
    vc: 262.7,
    dipole: 0.13,
    cp_r: [3.351, 17.883e-3, 5.477e-5, -8.099e-8, 3.243e-11],
};

const R134A: SpeciesConstants = SpeciesConstants {
    molar_mass: 102.032,
    tc: 374.21,
    pc: 4.0593e6,
    omega: 0.32684,
    vc: 199.3,
    dipole: 2.058,
    cp_r: [2.17345, 3.316415e-2, -2.427469e-5, 1.21416e-8, 0.0],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolprop_mapping() {
        assert_eq!(Species::O2.coolprop_name(), "Oxygen");
        assert_eq!(Species::R134a.coolprop_name(), "R134a");
        assert_eq!(Species::Propane.coolprop_name(), "n-Propane");
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("carbon dioxide".parse::<Species>().unwrap(), Species::CO2);
        assert_eq!("r134a".parse::<Species>().unwrap(), Species::R134a);
        assert_eq!("C3H8".parse::<Species>().unwrap(), Species::Propane);
        assert!("unobtainium".parse::<Species>().is_err());
    }

    #[test]
    fn canonical_keys_roundtrip() {
        for species in Species::ALL {
            let parsed = species
                .key()
                .parse::<Species>()
                .expect("canonical key should parse");
            assert_eq!(parsed, species);
        }
    }

    #[test]
    fn constants_are_physical() {
        for species in Species::ALL {
            let c = species.constants();
            assert!(c.tc > 0.0 && c.pc > 0.0 && c.vc > 0.0, "{species}");
            // cp/R of a real gas at room temperature sits between 2.5 (monatomic) and ~12
            let t: f64 = 300.0;
            let cp_r: f64 = c
                .cp_r
                .iter()
                .enumerate()
                .map(|(i, a)| a * t.powi(i as i32))
                .sum();
            assert!((2.49..12.0).contains(&cp_r), "{species}: cp/R = {cp_r}");
        }
    }

    #[test]
    fn co2_cp_matches_reference() {
        // NIST: cp0(CO2, 300 K) = 37.2 J/(mol K)
        let c = Species::CO2.constants();
        let t: f64 = 300.0;
        let cp_r: f64 = c
            .cp_r
            .iter()
            .enumerate()
            .map(|(i, a)| a * t.powi(i as i32))
            .sum();
        let cp = cp_r * cc_core::constants::R_UNIVERSAL;
        assert!((cp - 37.2).abs() < 0.5, "cp = {cp}");
    }
}
