//! Geometric image transformations.
//!
//! - Affine transform estimation from a (center, scale, rotation) region
//! - Affine transform estimation from three point correspondences
//! - Point transformation and affine inversion
//! - Affine image warping
//!
//! # Examples
//!
//! Cropping a region around `(320, 240)` into a 128x128 frame:
//!
//! ```
//! use ctdet_image::ImageSize;
//! use ctdet_imgproc::warp::{get_affine_transform, Scale};
//!
//! let m = get_affine_transform(
//!     [320.0, 240.0],
//!     Scale::Uniform(256.0),
//!     0.0,
//!     ImageSize { width: 128, height: 128 },
//!     [0.0, 0.0],
//!     false,
//! )
//! .unwrap();
//! // use with warp_affine to crop the image
//! ```

mod affine;

pub use affine::{
    get_affine_from_points, get_affine_transform, invert_affine_transform, transform_point,
    warp_affine, AffineError, Scale,
};
