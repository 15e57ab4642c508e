use ctdet_image::{Image, ImageError};
use rayon::prelude::*;

/// Mirror an image around its vertical axis.
///
/// Column `x` of the source lands in column `width - 1 - x` of the result, the
/// same convention as [`horizontal_flip_box`].
///
/// # Example
///
/// ```
/// use ctdet_image::{Image, ImageSize};
/// use ctdet_imgproc::flip::horizontal_flip;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![1, 2, 3]).unwrap();
/// let flipped = horizontal_flip(&image).unwrap();
///
/// assert_eq!(flipped.as_slice(), &[3, 2, 1]);
/// ```
pub fn horizontal_flip<T, const C: usize>(src: &Image<T, C>) -> Result<Image<T, C>, ImageError>
where
    T: Clone + Send + Sync,
{
    let mut dst = src.clone();
    let row_len = src.cols() * C;
    if row_len == 0 {
        return Ok(dst);
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(row_len)
        .zip(src.as_slice().par_chunks_exact(row_len))
        .for_each(|(dst_row, src_row)| {
            dst_row
                .chunks_exact_mut(C)
                .zip(src_row.chunks_exact(C).rev())
                .for_each(|(d, s)| d.clone_from_slice(s));
        });

    Ok(dst)
}

/// Mirror a box `[x1, y1, x2, y2]` inside an image of the given width.
///
/// Uses the pixel index convention `x' = width - x - 1`, so the box keeps its
/// size and applying the flip twice gives the box back.
pub fn horizontal_flip_box(bbox: [f32; 4], width: usize) -> [f32; 4] {
    let w = width as f32;
    [w - bbox[2] - 1.0, bbox[1], w - bbox[0] - 1.0, bbox[3]]
}
