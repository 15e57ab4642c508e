//! Row-parallel pixel loops.
//!
//! Each helper splits the interleaved buffer into rows, hands rows to rayon and
//! walks the pixels of a row sequentially. Images with zero columns are a no-op.

use rayon::prelude::*;

use ctdet_image::Image;

/// Map every pixel of `src` into the pixel at the same position in `dst`.
///
/// Both images must have the same size; the caller checks it.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }
    let src_rows = src.as_slice().par_chunks_exact(cols * C1);
    let dst_rows = dst.as_slice_mut().par_chunks_exact_mut(cols * C2);
    dst_rows.zip(src_rows).for_each(|(dst_row, src_row)| {
        for (d, s) in dst_row.chunks_exact_mut(C2).zip(src_row.chunks_exact(C1)) {
            f(s, d);
        }
    });
}

/// Update every pixel in place.
pub fn par_iter_rows_mut<T, const C: usize>(
    image: &mut Image<T, C>,
    f: impl Fn(&mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    par_iter_pixels_indexed_mut(image, |_, _, pixel| f(pixel));
}

/// Update every pixel in place, reading the pixel at the same position in `guide`.
pub fn par_iter_rows_guided<T1, const C1: usize, T2, const C2: usize>(
    image: &mut Image<T1, C1>,
    guide: &Image<T2, C2>,
    f: impl Fn(&mut [T1], &[T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = image.cols();
    if cols == 0 {
        return;
    }
    let guide_rows = guide.as_slice().par_chunks_exact(cols * C2);
    image
        .as_slice_mut()
        .par_chunks_exact_mut(cols * C1)
        .zip(guide_rows)
        .for_each(|(row, guide_row)| {
            for (p, g) in row.chunks_exact_mut(C1).zip(guide_row.chunks_exact(C2)) {
                f(p, g);
            }
        });
}

/// Update every pixel in place given its `(y, x)` position.
pub fn par_iter_pixels_indexed_mut<T, const C: usize>(
    image: &mut Image<T, C>,
    f: impl Fn(usize, usize, &mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    let cols = image.cols();
    if cols == 0 {
        return;
    }
    image
        .as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(y, row)| {
            row.chunks_exact_mut(C)
                .enumerate()
                .for_each(|(x, pixel)| f(y, x, pixel));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctdet_image::{ImageError, ImageSize};

    #[test]
    fn rows_map_into_other_channel_count() -> Result<(), ImageError> {
        let src = Image::<f32, 2>::new(ImageSize::from([2, 1]), vec![1.0, 2.0, 3.0, 4.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        par_iter_rows(&src, &mut dst, |s, d| d[0] = s[0] + s[1]);
        assert_eq!(dst.as_slice(), &[3.0, 7.0]);
        Ok(())
    }

    #[test]
    fn rows_mut_updates_in_place() -> Result<(), ImageError> {
        let mut image = Image::<f32, 2>::new(ImageSize::from([2, 1]), vec![1.0, 2.0, 3.0, 4.0])?;
        par_iter_rows_mut(&mut image, |pixel| {
            pixel[0] *= 2.0;
            pixel[1] += 1.0;
        });
        assert_eq!(image.as_slice(), &[2.0, 3.0, 6.0, 5.0]);
        Ok(())
    }

    #[test]
    fn guided_reads_the_guide_pixel() -> Result<(), ImageError> {
        let mut image = Image::<f32, 2>::new(ImageSize::from([2, 1]), vec![1.0, 2.0, 3.0, 4.0])?;
        let guide = Image::<f32, 1>::new(ImageSize::from([2, 1]), vec![10.0, 20.0])?;
        par_iter_rows_guided(&mut image, &guide, |pixel, g| {
            pixel.iter_mut().for_each(|p| *p += g[0]);
        });
        assert_eq!(image.as_slice(), &[11.0, 12.0, 23.0, 24.0]);
        Ok(())
    }

    #[test]
    fn indexed_sees_row_and_column() -> Result<(), ImageError> {
        let mut image = Image::<usize, 1>::from_size_val(ImageSize::from([3, 2]), 0)?;
        par_iter_pixels_indexed_mut(&mut image, |y, x, pixel| pixel[0] = 10 * y + x);
        assert_eq!(image.as_slice(), &[0, 1, 2, 10, 11, 12]);
        Ok(())
    }
}
