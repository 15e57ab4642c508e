/// Errors raised while building or converting images.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// The buffer cannot be viewed with the image shape.
    #[error("Invalid shape. {0}")]
    InvalidShape(#[from] ndarray::ShapeError),

    /// The buffer length does not match `width * height * channels`.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Two images that must share a size do not.
    #[error("Invalid image size ({0}, {1}), expected ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// An operation received an image with a zero side.
    #[error("Image is empty ({0}x{1})")]
    EmptyImage(usize, usize),

    /// A pixel value does not fit the target type.
    #[error("Failed to cast image data")]
    CastError,

    /// The resize backend rejected the pixel layout.
    #[error("Incompatible pixel types")]
    IncompatiblePixelTypes,
}
