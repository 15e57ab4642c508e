use crate::interpolation::InterpolationMode;
use ctdet_image::{Image, ImageError};
use fast_image_resize as fr;

/// Resize an 8-bit BGR image into `dst`, whose size is the target size.
///
/// The work is done by `fast_image_resize`. Equal sizes are a plain copy.
/// Fails with [`ImageError::EmptyImage`] when either side has a zero dimension.
///
/// ```
/// use ctdet_image::{Image, ImageSize};
/// use ctdet_imgproc::{interpolation::InterpolationMode, resize::resize_fast};
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize::from([4, 5]), 9).unwrap();
/// let mut half = Image::<u8, 3>::from_size_val(ImageSize::from([2, 3]), 0).unwrap();
///
/// resize_fast(&image, &mut half, InterpolationMode::Nearest).unwrap();
/// assert!(half.as_slice().iter().all(|&v| v == 9));
/// ```
pub fn resize_fast(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size().is_empty() {
        return Err(ImageError::EmptyImage(src.cols(), src.rows()));
    }
    if dst.size().is_empty() {
        return Err(ImageError::EmptyImage(dst.cols(), dst.rows()));
    }

    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let src_len = src.as_slice().len();
    let src_image = fr::images::ImageRef::new(
        src.width() as u32,
        src.height() as u32,
        src.as_slice(),
        fr::PixelType::U8x3,
    )
    .map_err(|_| ImageError::InvalidChannelShape(src_len, src.size().area() * 3))?;

    let (dst_width, dst_height) = (dst.width() as u32, dst.height() as u32);
    let dst_len = dst.as_slice().len();
    let mut dst_image = fr::images::Image::from_slice_u8(
        dst_width,
        dst_height,
        dst.as_slice_mut(),
        fr::PixelType::U8x3,
    )
    .map_err(|_| ImageError::InvalidChannelShape(dst_len, dst_len))?;

    let options = match interpolation {
        InterpolationMode::Bilinear => fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
        InterpolationMode::Nearest => fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Nearest),
    };

    fr::Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|_| ImageError::IncompatiblePixelTypes)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::interpolation::InterpolationMode;
    use ctdet_image::{Image, ImageError, ImageSize};

    #[test]
    fn resize_same_size_is_copy() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_fn(ImageSize::from([4, 3]), |y, x, c| {
            (y * 12 + x * 3 + c) as u8
        });
        let mut resized = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::resize_fast(&image, &mut resized, InterpolationMode::Bilinear)?;
        assert_eq!(resized, image);
        Ok(())
    }

    #[test]
    fn resize_constant_image() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(ImageSize::from([8, 6]), 200)?;
        let mut resized = Image::<u8, 3>::from_size_val(ImageSize::from([4, 3]), 0)?;
        super::resize_fast(&image, &mut resized, InterpolationMode::Bilinear)?;
        assert!(resized.as_slice().iter().all(|&v| v == 200));
        Ok(())
    }

    #[test]
    fn resize_empty_source() {
        let image = Image::<u8, 3>::new(ImageSize::from([0, 3]), vec![]).unwrap();
        let mut resized = Image::<u8, 3>::from_size_val(ImageSize::from([4, 3]), 0).unwrap();
        assert_eq!(
            super::resize_fast(&image, &mut resized, InterpolationMode::Bilinear),
            Err(ImageError::EmptyImage(0, 3))
        );
    }
}
