#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::TargetError;

/// gaussian radius and stamping utilities.
pub mod gaussian;

/// dense training targets of a single sample.
pub mod targets;

pub use gaussian::{draw_gaussian, gaussian_2d, gaussian_radius, DEFAULT_MIN_OVERLAP};
pub use targets::CenterNetTargets;
