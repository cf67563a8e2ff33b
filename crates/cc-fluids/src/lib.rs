//! cc-fluids: fluid property calculations for compressor performance work.
//!
//! Provides:
//! - Chemical species catalogue with critical constants and ideal-gas heat capacities
//! - Composition handling (pure fluids and mole-fraction mixtures)
//! - Immutable thermodynamic states carrying their full property pack
//! - `FluidModel` trait for property calculations
//! - A Peng-Robinson mixture backend and a CoolProp backend
//!
//! # Architecture
//!
//! The rest of the workspace only talks to `FluidModel`. Every call takes a
//! composition plus one of the independent property pairs in [`StateInput`] and
//! returns a [`ThermoState`] that already holds p, T, h, s, rho, cp, cv, speed of
//! sound, viscosity and compressibility. States are never mutated; "updating" one
//! produces a fresh value.
//!
//! # Example
//!
//! ```no_run
//! use cc_fluids::{Composition, FluidModel, PengRobinsonModel, StateInput};
//! use cc_core::units::{bar, k};
//!
//! let model = PengRobinsonModel::default();
//! let comp = Composition::from_names(&[("CO2", 0.8), ("R134a", 0.2)]).unwrap();
//! let suc = model
//!     .state(StateInput::PT { p: bar(1.826), t: k(296.7) }, comp)
//!     .unwrap();
//! println!("Density: {} kg/m³", suc.rho().value);
//! ```

pub mod composition;
pub mod coolprop;
pub mod error;
pub mod model;
pub mod peng_robinson;
pub mod species;
pub mod state;
pub mod transport;
pub mod units;

pub use composition::Composition;
pub use coolprop::CoolPropModel;
pub use error::{FluidError, FluidResult};
pub use model::{FluidModel, ThermoPropertyPack};
pub use peng_robinson::PengRobinsonModel;
pub use species::{Species, SpeciesConstants};
pub use state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput, ThermoState};
pub use units::{Quantity, UnitError, format_quantity, parse_quantity};
