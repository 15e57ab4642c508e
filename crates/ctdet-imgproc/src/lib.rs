#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Photometric jitter: lighting noise, brightness, contrast, saturation.
pub mod augment;

/// Channel order and grayscale conversions.
pub mod color;

/// Horizontal mirroring of images and boxes.
pub mod flip;

/// Pixel sampling at fractional coordinates.
pub mod interpolation;

/// Per-channel standardization.
pub mod normalize;

/// Row-parallel pixel loops.
pub mod parallel;

/// Resizing through `fast_image_resize`.
pub mod resize;

/// Affine transforms: construction, inversion and image warping.
pub mod warp;
