use std::path::Path;

use ctdet_image::{Image, ImageSize};
use ctdet_imgproc::color::bgr_from_rgb;

use crate::error::DatasetError;

/// Decodes the image files of a dataset.
pub trait ImageReader {
    /// Read an 8-bit 3 channel image in BGR order.
    fn read_bgr(&self, path: &Path) -> Result<Image<u8, 3>, DatasetError>;
}

/// An [`ImageReader`] decoding any format supported by the `image` crate.
///
/// Gray and alpha images are converted to 3 channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageReader;

impl ImageReader for FileImageReader {
    fn read_bgr(&self, path: &Path) -> Result<Image<u8, 3>, DatasetError> {
        let io_err = |source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        };

        let decoded = image::ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?
            .decode()
            .map_err(|source| match source {
                image::ImageError::IoError(source) => DatasetError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                source => DatasetError::Decode {
                    path: path.to_path_buf(),
                    source,
                },
            })?;

        let size = ImageSize {
            width: decoded.width() as usize,
            height: decoded.height() as usize,
        };
        let rgb = Image::<u8, 3>::new(size, decoded.into_rgb8().into_raw())?;

        let mut bgr = Image::<u8, 3>::from_size_val(size, 0)?;
        bgr_from_rgb(&rgb, &mut bgr)?;

        Ok(bgr)
    }
}
