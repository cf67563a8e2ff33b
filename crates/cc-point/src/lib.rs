//! cc-point: compressor operating points and their conversion.
//!
//! Provides:
//! - Operating points closed from one of four input combinations
//! - Polytropic head and efficiency correlations
//! - Similarity conversion to new suction conditions, with the PTC 10
//!   Reynolds correction
//! - Constant-speed performance curves
//!
//! # Architecture
//!
//! A [`PerfContext`] carries the fluid backend, the polytropic method and the
//! iteration settings. It is passed into every construction, so a [`Point`]
//! never depends on global state and always records the method it was built
//! with. Points are immutable; conversion produces new points.
//!
//! # Example
//!
//! ```no_run
//! use cc_core::units::{bar, k, kgps, mm, rpm};
//! use cc_fluids::{Composition, FluidModel, PengRobinsonModel, StateInput};
//! use cc_point::{Flow, Geometry, PerfContext, Point, PointInput, PolytropicMethod};
//!
//! let model = PengRobinsonModel::default();
//! let comp = Composition::from_names(&[("CO2", 0.8), ("R134a", 0.2)]).unwrap();
//! let suc = model.state(StateInput::PT { p: bar(1.826), t: k(296.7) }, comp.clone()).unwrap();
//! let disch = model.state(StateInput::PT { p: bar(6.142), t: k(392.1) }, comp).unwrap();
//!
//! let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
//! let point = Point::new(
//!     &ctx,
//!     PointInput::DischSuc { suc, disch },
//!     Flow::Mass(kgps(7.737)),
//!     rpm(7894.0),
//!     Geometry::new(mm(28.5), mm(365.0)),
//! )
//! .unwrap();
//! println!("eff = {:.4}", point.eff());
//! ```

mod closure;
pub mod curve;
pub mod error;
pub mod point;
pub mod polytropic;
pub mod reynolds;
pub mod similarity;

pub use curve::Curve;
pub use error::{PerfError, PerfResult};
pub use point::{Flow, Geometry, PerfContext, Point, PointInput, PointSpec};
pub use polytropic::{PolytropicHead, PolytropicMethod, polytropic_exponent};
pub use reynolds::{
    REFERENCE_ROUGHNESS_IN, REYNOLDS_RATIO_BAND, ReynoldsCondition, ReynoldsCorrection,
    corrected_efficiency, mach_deviation_limits,
};
pub use similarity::{ConvertOptions, Find, convert_from, mach_deviation};
