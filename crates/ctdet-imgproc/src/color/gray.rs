use crate::parallel;
use ctdet_image::{Image, ImageError};

/// Luma weights in blue, green, red order.
const BGR_LUMA: [f64; 3] = [0.114, 0.587, 0.299];

fn check_same_size<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &Image<T2, C2>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Convert a BGR image to grayscale using the formula:
///
/// Y = 0.114 * B + 0.587 * G + 0.299 * R
///
/// Precondition: the input and output images must have the same size.
pub fn gray_from_bgr<T>(src: &Image<T, 3>, dst: &mut Image<T, 1>) -> Result<(), ImageError>
where
    T: Send + Sync + num_traits::Float,
{
    check_same_size(src, dst)?;

    let mut weights = [T::zero(); 3];
    for (w, &luma) in weights.iter_mut().zip(BGR_LUMA.iter()) {
        *w = T::from(luma).ok_or(ImageError::CastError)?;
    }

    parallel::par_iter_rows(src, dst, |bgr, gray| {
        gray[0] = bgr
            .iter()
            .zip(weights.iter())
            .fold(T::zero(), |acc, (&v, &w)| acc + v * w);
    });

    Ok(())
}

/// Swap the first and last channel of a 3 channel image.
///
/// The same operation converts RGB to BGR and BGR to RGB.
///
/// Precondition: the input and output images must have the same size.
pub fn bgr_from_rgb<T>(src: &Image<T, 3>, dst: &mut Image<T, 3>) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    check_same_size(src, dst)?;

    parallel::par_iter_rows(src, dst, |s, d| {
        d.copy_from_slice(&[s[2], s[1], s[0]]);
    });

    Ok(())
}

/// Mean over all the elements of a single channel image.
///
/// Returns zero for an empty image.
pub fn mean_value(src: &Image<f32, 1>) -> f32 {
    let n = src.as_slice().len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = src.as_slice().iter().map(|&v| v as f64).sum();
    (sum / n as f64) as f32
}
