#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Interleaved image buffer and its size.
pub mod image;

/// Error type shared by the image crates.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
