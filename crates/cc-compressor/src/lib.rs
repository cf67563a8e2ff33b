//! cc-compressor: test-to-guarantee conversion of whole compressors.
//!
//! Provides:
//! - Flange test points with auxiliary measurements (`Point1Sec`,
//!   `PointFirstSection`, `PointSecondSection`)
//! - Flange/rotor leakage and energy balances, casing heat loss
//! - Bearing mechanical losses from oil calorimetry
//! - `StraightThrough` and `BackToBack` assemblies with speed matching
//!
//! # Architecture
//!
//! Each test point is carried flange(test) → rotor(test) → rotor(specified)
//! → flange(specified). Only the middle step depends on the operating speed,
//! so speed matching re-runs it alone. Test points are converted in parallel.
//! Assemblies are immutable; speed matching returns a new one.

pub mod back_to_back;
pub mod bearing;
pub mod config;
pub mod conversion;
pub mod error;
pub mod leakage;
pub mod section;
mod speed_match;
pub mod straight_through;

pub use back_to_back::{BackToBack, BackToBackPoint, BackToBackTest};
pub use bearing::{BearingOil, IsoVg, OilProperties, OilStream};
pub use config::CorrectionConfig;
pub use conversion::{ConvertedPoint, GuaranteeRatios};
pub use error::{CompressorError, CompressorResult};
pub use section::{CasingHeat, Point1Sec, PointFirstSection, PointSecondSection, SealGas, SealUpstream};
pub use straight_through::{StraightThrough, convert_test_point};
