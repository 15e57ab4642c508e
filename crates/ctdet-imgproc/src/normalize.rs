use num_traits::Float;

use ctdet_image::{Image, ImageError};

use crate::parallel;

/// Standardize each channel: `dst = (src - mean) / std`.
///
/// `src` and `dst` must have the same size, otherwise
/// [`ImageError::InvalidImageSize`] is returned.
///
/// ```
/// use ctdet_image::{Image, ImageSize};
/// use ctdet_imgproc::normalize::normalize_mean_std;
///
/// let image = Image::<f32, 3>::from_size_val(ImageSize::from([8, 8]), 0.5).unwrap();
/// let mut out = Image::<f32, 3>::from_size_val(image.size(), 0.0).unwrap();
///
/// normalize_mean_std(&image, &mut out, &[0.5, 0.5, 0.5], &[0.25, 0.25, 0.25]).unwrap();
/// assert!(out.as_slice().iter().all(|&v| v == 0.0));
/// ```
pub fn normalize_mean_std<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    mean: &[T; C],
    std: &[T; C],
) -> Result<(), ImageError>
where
    T: Send + Sync + Float,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |s, d| {
        for c in 0..C {
            d[c] = (s[c] - mean[c]) / std[c];
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ctdet_image::{Image, ImageError, ImageSize};

    #[test]
    fn per_channel_statistics() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new(
            ImageSize::from([2, 1]),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        )?;
        let mut out = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;

        super::normalize_mean_std(&image, &mut out, &[0.5, 1.0, 1.0], &[0.5, 2.0, 4.0])?;

        let expected = [-1.0, 0.0, 0.25, 5.0, 1.5, 1.0];
        for (a, b) in out.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(a, b);
        }
        Ok(())
    }

    #[test]
    fn size_mismatch() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::from_size_val(ImageSize::from([2, 1]), 0.0)?;
        let mut out = Image::<f32, 3>::from_size_val(ImageSize::from([1, 2]), 0.0)?;
        let res = super::normalize_mean_std(&image, &mut out, &[0.0; 3], &[1.0; 3]);
        assert_eq!(res, Err(ImageError::InvalidImageSize(2, 1, 1, 2)));
        Ok(())
    }
}
