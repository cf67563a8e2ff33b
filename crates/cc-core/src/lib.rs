//! cc-core: shared foundation for the compressor performance workspace.
//!
//! Contains:
//! - units (uom SI types + constructors for the quantities a test report uses)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CcError, CcResult};
pub use numeric::*;
pub use units::*;
