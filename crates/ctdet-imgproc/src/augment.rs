//! Random photometric augmentation.
//!
//! Brightness, contrast and saturation jitter applied in a caller supplied
//! order, followed by PCA ("AlexNet style") lighting noise. Every function works
//! in place on a floating point BGR image with values roughly in `[0, 1]`.
//!
//! # Example
//!
//! ```
//! use ctdet_image::{Image, ImageSize};
//! use ctdet_imgproc::augment::{color_aug, random_color_order};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut image = Image::<f32, 3>::from_size_val(ImageSize { width: 8, height: 8 }, 0.5).unwrap();
//!
//! let eig_val = [0.2141788, 0.01817699, 0.00341571];
//! let eig_vec = [
//!     [-0.58752847, -0.69563484, 0.41340352],
//!     [-0.5832747, 0.00994535, -0.81221408],
//!     [-0.56089297, 0.71832671, 0.41158938],
//! ];
//!
//! let order = random_color_order(&mut rng);
//! color_aug(&mut image, &mut rng, &order, &eig_val, &eig_vec).unwrap();
//! ```

use rand::{seq::SliceRandom, Rng};
use rand_distr::{Distribution, StandardNormal};

use ctdet_image::{Image, ImageError};

use crate::color::{gray_from_bgr, mean_value};
use crate::parallel;

/// Bound of the uniform jitter drawn for brightness, contrast and saturation.
pub const COLOR_JITTER_VAR: f32 = 0.4;

/// Standard deviation of the PCA lighting coefficients.
pub const LIGHTING_ALPHA_STD: f32 = 0.1;

/// One of the three photometric jitter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorOp {
    /// Scale the whole image.
    Brightness,
    /// Blend towards the mean gray level.
    Contrast,
    /// Blend towards the per pixel gray level.
    Saturation,
}

impl ColorOp {
    /// All the operations in their canonical order.
    pub const ALL: [ColorOp; 3] = [ColorOp::Brightness, ColorOp::Contrast, ColorOp::Saturation];
}

/// Draw a uniformly random permutation of the three jitter operations.
pub fn random_color_order<R: Rng>(rng: &mut R) -> [ColorOp; 3] {
    let mut order = ColorOp::ALL;
    order.shuffle(rng);
    order
}

/// Draw a jitter factor `1 + U(-var, var)`.
fn jitter_factor<R: Rng>(rng: &mut R, var: f32) -> f32 {
    1.0 + rng.random_range(-var..var)
}

/// Multiply every element of the image by `alpha`.
pub fn brightness(image: &mut Image<f32, 3>, alpha: f32) {
    parallel::par_iter_rows_mut(image, |pixel| pixel.iter_mut().for_each(|v| *v *= alpha));
}

/// Blend the image with its mean gray level: `img * alpha + gray_mean * (1 - alpha)`.
pub fn contrast(image: &mut Image<f32, 3>, gray_mean: f32, alpha: f32) {
    let offset = gray_mean * (1.0 - alpha);
    parallel::par_iter_rows_mut(image, |pixel| {
        pixel.iter_mut().for_each(|v| *v = *v * alpha + offset)
    });
}

/// Blend every pixel with its gray level: `img * alpha + gray * (1 - alpha)`.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if `gray` and `image` differ in size.
pub fn saturation(
    image: &mut Image<f32, 3>,
    gray: &Image<f32, 1>,
    alpha: f32,
) -> Result<(), ImageError> {
    if image.size() != gray.size() {
        return Err(ImageError::InvalidImageSize(
            image.cols(),
            image.rows(),
            gray.cols(),
            gray.rows(),
        ));
    }

    let beta = 1.0 - alpha;
    parallel::par_iter_rows_guided(image, gray, |pixel, g| {
        let offset = g[0] * beta;
        pixel.iter_mut().for_each(|v| *v = *v * alpha + offset)
    });

    Ok(())
}

/// Add PCA lighting noise to the image.
///
/// Draws `alpha ~ N(0, alphastd)` for each principal component and adds
/// `eig_vec · (eig_val ∘ alpha)` to every pixel. Returns the added offset.
pub fn lighting<R: Rng>(
    image: &mut Image<f32, 3>,
    rng: &mut R,
    alphastd: f32,
    eig_val: &[f32; 3],
    eig_vec: &[[f32; 3]; 3],
) -> [f32; 3] {
    let alpha: [f32; 3] = std::array::from_fn(|_| {
        let z: f32 = StandardNormal.sample(rng);
        z * alphastd
    });

    let delta: [f32; 3] = std::array::from_fn(|row| {
        (0..3)
            .map(|j| eig_vec[row][j] * eig_val[j] * alpha[j])
            .sum()
    });

    parallel::par_iter_rows_mut(image, |pixel| {
        pixel.iter_mut().zip(delta.iter()).for_each(|(v, d)| *v += d)
    });

    delta
}

/// Random color augmentation, in place.
///
/// The gray image and its mean are computed once from the input, then every
/// operation of `order` draws its own factor from `rng` and is applied in turn.
/// PCA lighting noise is added last.
///
/// # Arguments
///
/// * `image` - Floating point BGR image, modified in place.
/// * `rng` - Random generator for the jitter factors and lighting coefficients.
/// * `order` - Order in which the jitter operations are applied.
/// * `eig_val` - Eigenvalues of the pixel covariance.
/// * `eig_vec` - Eigenvectors of the pixel covariance, one per column.
pub fn color_aug<R: Rng>(
    image: &mut Image<f32, 3>,
    rng: &mut R,
    order: &[ColorOp; 3],
    eig_val: &[f32; 3],
    eig_vec: &[[f32; 3]; 3],
) -> Result<(), ImageError> {
    let mut gray = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
    gray_from_bgr(image, &mut gray)?;
    let gray_mean = mean_value(&gray);

    for op in order {
        let alpha = jitter_factor(rng, COLOR_JITTER_VAR);
        match op {
            ColorOp::Brightness => brightness(image, alpha),
            ColorOp::Contrast => contrast(image, gray_mean, alpha),
            ColorOp::Saturation => saturation(image, &gray, alpha)?,
        }
    }

    lighting(image, rng, LIGHTING_ALPHA_STD, eig_val, eig_vec);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ctdet_image::ImageSize;
    use rand::{rngs::StdRng, SeedableRng};

    const EIG_VAL: [f32; 3] = [0.2141788, 0.01817699, 0.00341571];
    const EIG_VEC: [[f32; 3]; 3] = [
        [-0.58752847, -0.69563484, 0.41340352],
        [-0.5832747, 0.00994535, -0.81221408],
        [-0.56089297, 0.71832671, 0.41158938],
    ];

    fn ramp() -> Image<f32, 3> {
        Image::from_size_fn(ImageSize::from([4, 3]), |y, x, c| {
            (y * 4 + x) as f32 / 12.0 + c as f32 * 0.05
        })
    }

    #[test]
    fn random_order_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let order = random_color_order(&mut rng);
            for op in ColorOp::ALL {
                assert_eq!(order.iter().filter(|&&o| o == op).count(), 1);
            }
        }
    }

    #[test]
    fn brightness_scales() {
        let mut image = ramp();
        let original = image.clone();
        brightness(&mut image, 1.25);
        for (a, b) in image.as_slice().iter().zip(original.as_slice()) {
            assert_relative_eq!(*a, b * 1.25);
        }
    }

    #[test]
    fn contrast_blends_towards_mean() {
        let mut image = ramp();
        contrast(&mut image, 0.5, 0.0);
        assert!(image.as_slice().iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn saturation_blends_towards_gray() -> Result<(), ImageError> {
        let mut image = ramp();
        let mut gray = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        gray_from_bgr(&image, &mut gray)?;

        saturation(&mut image, &gray, 0.0)?;
        for (pixel, g) in image.as_slice().chunks_exact(3).zip(gray.as_slice()) {
            for v in pixel {
                assert_relative_eq!(v, g, epsilon = 1e-6);
            }
        }
        Ok(())
    }

    #[test]
    fn lighting_adds_the_same_offset_everywhere() {
        let mut rng = StdRng::seed_from_u64(123);
        let mut image = ramp();
        let original = image.clone();
        let delta = lighting(&mut image, &mut rng, 0.1, &EIG_VAL, &EIG_VEC);
        for (pixel, orig) in image
            .as_slice()
            .chunks_exact(3)
            .zip(original.as_slice().chunks_exact(3))
        {
            for c in 0..3 {
                assert_relative_eq!(pixel[c] - orig[c], delta[c], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn color_aug_is_deterministic_for_a_seed() -> Result<(), ImageError> {
        let order = [ColorOp::Saturation, ColorOp::Brightness, ColorOp::Contrast];

        let mut a = ramp();
        let mut rng = StdRng::seed_from_u64(123);
        color_aug(&mut a, &mut rng, &order, &EIG_VAL, &EIG_VEC)?;

        let mut b = ramp();
        let mut rng = StdRng::seed_from_u64(123);
        color_aug(&mut b, &mut rng, &order, &EIG_VAL, &EIG_VEC)?;

        assert_eq!(a, b);
        assert_ne!(a, ramp());
        Ok(())
    }

    #[test]
    fn color_aug_factors_stay_in_bounds() -> Result<(), ImageError> {
        // a constant image is its own gray level: v = 1 + (b - 1) * c * s
        let bound = COLOR_JITTER_VAR * (1.0 + COLOR_JITTER_VAR).powi(2);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let mut image = Image::<f32, 3>::from_size_val(ImageSize::from([2, 2]), 1.0)?;
            color_aug(&mut image, &mut rng, &ColorOp::ALL, &[0.0; 3], &EIG_VEC)?;
            let v = image.as_slice()[0];
            assert!((v - 1.0).abs() <= bound + 1e-5);
            assert!(image.as_slice().iter().all(|&p| (p - v).abs() < 1e-6));
        }
        Ok(())
    }
}
