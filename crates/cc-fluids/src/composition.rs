//! Fluid composition (pure or mixtures).

use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use cc_core::numeric::{Tolerances, nearly_equal};

/// Accepted distance from 1 (fractions) when validating user compositions.
const UNIT_SUM_TOL: f64 = 0.01;
/// Accepted distance from 100 (percentages) when validating user compositions.
const PERCENT_SUM_TOL: f64 = 1.0;

/// Fluid composition defined by normalized mole fractions.
///
/// The composition is always normalized (mole fractions sum to 1.0) and its
/// species are kept in catalogue order, so two compositions built from the same
/// fractions in a different order compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Species and their mole fractions (always normalized to sum=1).
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: Species) -> Self {
        Self {
            items: vec![(species, 1.0)],
        }
    }

    /// Create a composition from mole fractions.
    ///
    /// Validates that all fractions are finite, non-negative, and have a positive sum,
    /// then normalizes to sum=1. Repeated species are merged.
    pub fn new_mole_fractions(fractions: Vec<(Species, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "empty composition",
            });
        }

        let mut sum = 0.0;
        for (_, frac) in &fractions {
            if !frac.is_finite() {
                return Err(FluidError::NonPhysical {
                    what: "non-finite mole fraction",
                });
            }
            if *frac < 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
        }

        if sum <= 0.0 || !sum.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "mole fractions sum to zero or non-finite",
            });
        }

        let mut merged: Vec<(Species, f64)> = Vec::with_capacity(fractions.len());
        for (species, frac) in fractions {
            match merged.iter_mut().find(|(s, _)| *s == species) {
                Some((_, f)) => *f += frac,
                None => merged.push((species, frac)),
            }
        }
        merged.sort_by_key(|(s, _)| *s);

        let normalized: Vec<(Species, f64)> = merged
            .into_iter()
            .map(|(s, f)| (s, f / sum))
            .filter(|(_, f)| *f > 1e-15)
            .collect();

        if normalized.is_empty() {
            return Err(FluidError::NonPhysical {
                what: "all mole fractions negligible",
            });
        }

        Ok(Self { items: normalized })
    }

    /// Create a composition from component names, as found in data sheets and
    /// project files.
    ///
    /// The fractions must sum to about 1 (mole fractions) or about 100 (mole
    /// percent); anything else is rejected before any property lookup.
    pub fn from_names<S: AsRef<str>>(fractions: &[(S, f64)]) -> FluidResult<Self> {
        let mut parsed = Vec::with_capacity(fractions.len());
        for (name, frac) in fractions {
            let species: Species =
                name.as_ref()
                    .parse()
                    .map_err(|_| FluidError::UnknownSpecies {
                        name: name.as_ref().to_string(),
                    })?;
            parsed.push((species, *frac));
        }

        let sum: f64 = parsed.iter().map(|(_, f)| f).sum();
        let near_unit = (sum - 1.0).abs() <= UNIT_SUM_TOL;
        let near_percent = (sum - 100.0).abs() <= PERCENT_SUM_TOL;
        if !(near_unit || near_percent) {
            return Err(FluidError::CompositionSum { sum });
        }

        Self::new_mole_fractions(parsed)
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Check if this is a pure-species composition.
    ///
    /// Returns `Some(species)` if exactly one species has fraction ≈1.0.
    pub fn is_pure(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Number of species present.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compute mixture molar mass [kg/kmol] from species mole fractions.
    ///
    /// For a mixture: M_mix = Σ (x_i * M_i) where x_i is mole fraction of species i.
    pub fn molar_mass(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, mole_frac)| species.molar_mass() * mole_frac)
            .sum()
    }

    /// Name/fraction pairs using canonical species keys.
    pub fn to_named(&self) -> Vec<(String, f64)> {
        self.items
            .iter()
            .map(|(s, f)| (s.key().to_string(), *f))
            .collect()
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (species, frac) in &self.items {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:.5}", species.key(), frac)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-10,
            rel: 1e-10,
        }
    }

    #[test]
    fn pure_composition() {
        let comp = Composition::pure(Species::O2);
        assert_eq!(comp.is_pure(), Some(Species::O2));
        assert_eq!(comp.mole_fraction(Species::O2), 1.0);
        assert_eq!(comp.mole_fraction(Species::N2), 0.0);
    }

    #[test]
    fn mixture_normalization_non_unit_sum() {
        let comp =
            Composition::new_mole_fractions(vec![(Species::O2, 2.0), (Species::N2, 8.0)]).unwrap();

        assert!(nearly_equal(comp.mole_fraction(Species::O2), 0.2, tol()));
        assert!(nearly_equal(comp.mole_fraction(Species::N2), 0.8, tol()));
    }

    #[test]
    fn order_does_not_matter() {
        let a =
            Composition::new_mole_fractions(vec![(Species::CO2, 0.8), (Species::N2, 0.2)]).unwrap();
        let b =
            Composition::new_mole_fractions(vec![(Species::N2, 0.2), (Species::CO2, 0.8)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_species_are_merged() {
        let comp = Composition::new_mole_fractions(vec![
            (Species::N2, 0.25),
            (Species::O2, 0.5),
            (Species::N2, 0.25),
        ])
        .unwrap();
        assert_eq!(comp.len(), 2);
        assert!(nearly_equal(comp.mole_fraction(Species::N2), 0.5, tol()));
    }

    #[test]
    fn invalid_negative_fraction() {
        let result = Composition::new_mole_fractions(vec![(Species::O2, -0.5), (Species::N2, 1.5)]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_zero_sum() {
        let result = Composition::new_mole_fractions(vec![(Species::O2, 0.0), (Species::N2, 0.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_non_finite() {
        let result = Composition::new_mole_fractions(vec![(Species::O2, f64::NAN)]);
        assert!(result.is_err());
    }

    #[test]
    fn from_names_accepts_fractions_and_percent() {
        let frac = Composition::from_names(&[
            ("CO2", 0.80218),
            ("R134a", 0.18842),
            ("N2", 0.0091),
            ("O2", 0.0003),
        ])
        .unwrap();
        let pct = Composition::from_names(&[
            ("carbon dioxide", 80.218),
            ("R134A", 18.842),
            ("nitrogen", 0.91),
            ("oxygen", 0.03),
        ])
        .unwrap();
        assert_eq!(frac.len(), 4);
        for (species, x) in frac.iter() {
            assert!(nearly_equal(x, pct.mole_fraction(species), tol()));
        }
    }

    #[test]
    fn from_names_rejects_unknown_component() {
        let err = Composition::from_names(&[("CO2", 0.5), ("kryptonite", 0.5)]).unwrap_err();
        assert!(matches!(err, FluidError::UnknownSpecies { ref name } if name == "kryptonite"));
    }

    #[test]
    fn from_names_rejects_odd_sum() {
        let err = Composition::from_names(&[("CO2", 0.5), ("N2", 0.2)]).unwrap_err();
        assert!(matches!(err, FluidError::CompositionSum { .. }));
    }

    #[test]
    fn mixture_molar_mass() {
        let comp =
            Composition::new_mole_fractions(vec![(Species::N2, 0.5), (Species::CO2, 0.5)]).unwrap();
        let expected = 0.5 * Species::N2.molar_mass() + 0.5 * Species::CO2.molar_mass();
        assert!(nearly_equal(comp.molar_mass(), expected, tol()));
    }
}
