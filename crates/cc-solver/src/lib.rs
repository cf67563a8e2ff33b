//! Bounded scalar root finding and least-squares polynomial fitting.
//!
//! Every iteration in the workspace (point closures, similarity speed search,
//! leakage inversion, speed matching) goes through [`newton_scalar`] or
//! [`fixed_point`], so all of them share the same iteration budget handling
//! and report failure the same way.

pub mod error;
pub mod newton;
pub mod polyfit;

pub use error::{SolverError, SolverResult};
pub use newton::{FixedPointConfig, NewtonConfig, ScalarRoot, fixed_point, newton_scalar};
pub use polyfit::Polynomial;
