use crate::error::ImageError;

/// Width and height of an image, in pixels.
///
/// ```
/// use ctdet_image::ImageSize;
///
/// let size = ImageSize::from([640, 480]);
/// assert_eq!((size.width, size.height), (640, 480));
/// assert_eq!(size.area(), 640 * 480);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns true if either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// `[width, height]`
impl From<[usize; 2]> for ImageSize {
    fn from([width, height]: [usize; 2]) -> Self {
        ImageSize { width, height }
    }
}

/// `[width, height]` as floats, the layout used by the affine helpers.
impl From<ImageSize> for [f32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width as f32, size.height as f32]
    }
}

/// An interleaved image with `CHANNELS` values per pixel.
///
/// The buffer is row-major `(H, W, C)`: element `[y, x, c]` lives at
/// `(y * W + x) * C + c`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Wrap an interleaved pixel buffer.
    ///
    /// Fails with [`ImageError::InvalidChannelShape`] when `data` does not hold
    /// exactly `width * height * CHANNELS` values.
    ///
    /// ```
    /// use ctdet_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(ImageSize::from([4, 2]), vec![0; 24]).unwrap();
    /// assert_eq!(image.rows(), 2);
    /// assert!(Image::<u8, 3>::new(ImageSize::from([4, 2]), vec![0; 23]).is_err());
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.area() * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }
        Ok(Self { size, data })
    }

    /// An image with every element set to `val`.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Image::new(size, vec![val; size.area() * CHANNELS])
    }

    /// An image whose element `[y, x, c]` is `f(y, x, c)`.
    pub fn from_size_fn(size: ImageSize, f: impl Fn(usize, usize, usize) -> T) -> Self {
        let data = (0..size.height)
            .flat_map(|y| (0..size.width).map(move |x| (y, x)))
            .flat_map(|(y, x)| (0..CHANNELS).map(move |c| (y, x, c)))
            .map(|(y, x, c)| f(y, x, c))
            .collect();
        Self { size, data }
    }

    /// Size of the image.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Width in pixels, same as [`Image::cols`].
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Height in pixels, same as [`Image::rows`].
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Values per pixel.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// The interleaved buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The interleaved buffer, mutably.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Element at `[y, x, c]`, or `None` outside the image.
    pub fn get(&self, [y, x, c]: [usize; 3]) -> Option<&T> {
        (y < self.rows() && x < self.cols() && c < CHANNELS)
            .then(|| &self.data[(y * self.cols() + x) * CHANNELS + c])
    }

    /// Convert every element to `U` and multiply it by `scale`.
    ///
    /// ```
    /// use ctdet_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 1>::new(ImageSize::from([2, 1]), vec![0, 255]).unwrap();
    /// let unit = image.cast_and_scale::<f32>(1.0 / 255.0).unwrap();
    /// assert_eq!(unit.as_slice(), &[0.0, 1.0]);
    /// ```
    pub fn cast_and_scale<U>(&self, scale: U) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: num_traits::NumCast + std::ops::Mul<Output = U> + Copy,
        T: num_traits::NumCast + Copy,
    {
        let data = self
            .data
            .iter()
            .map(|&v| U::from(v).map(|v| v * scale).ok_or(ImageError::CastError))
            .collect::<Result<Vec<U>, _>>()?;
        Image::new(self.size, data)
    }

    /// Copy the pixels into a channel-first `(C, H, W)` array.
    ///
    /// ```
    /// use ctdet_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32, 2>::new(ImageSize::from([2, 1]), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    /// let chw = image.to_chw().unwrap();
    /// assert_eq!(chw.shape(), &[2, 1, 2]);
    /// assert_eq!(chw[[1, 0, 1]], 3.0);
    /// ```
    pub fn to_chw(&self) -> Result<ndarray::Array3<T>, ImageError>
    where
        T: Clone,
    {
        let hwc = ndarray::ArrayView3::from_shape(
            (self.rows(), self.cols(), CHANNELS),
            self.data.as_slice(),
        )?;
        Ok(hwc.permuted_axes([2, 0, 1]).as_standard_layout().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn size_helpers() {
        let size = ImageSize::from([10, 20]);
        assert_eq!(size.area(), 200);
        assert!(!size.is_empty());
        assert!(ImageSize::from([0, 3]).is_empty());
        assert_eq!(size.to_string(), "10x20");
        assert_eq!(<[f32; 2]>::from(size), [10.0, 20.0]);
    }

    #[test]
    fn new_checks_the_buffer_length() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(ImageSize::from([10, 20]), vec![0; 600])?;
        assert_eq!(image.cols(), 10);
        assert_eq!(image.rows(), 20);
        assert_eq!(image.num_channels(), 3);

        let res = Image::<u8, 3>::new(ImageSize::from([2, 2]), vec![0u8; 5]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(5, 12)));
        Ok(())
    }

    #[test]
    fn get_is_bounds_checked() {
        let image = Image::<u8, 2>::from_size_fn(ImageSize::from([3, 2]), |y, x, c| {
            (y * 100 + x * 10 + c) as u8
        });
        assert_eq!(image.get([1, 2, 1]), Some(&121));
        assert_eq!(image.get([2, 0, 0]), None);
        assert_eq!(image.get([0, 3, 0]), None);
        assert_eq!(image.get([0, 0, 2]), None);
    }

    #[test]
    fn cast_and_scale_to_unit_range() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(ImageSize::from([2, 2]), 51)?;
        let scaled = image.cast_and_scale::<f32>(1.0 / 255.0)?;
        assert!(scaled.as_slice().iter().all(|&v| (v - 0.2).abs() < 1e-6));
        Ok(())
    }

    #[test]
    fn to_chw_moves_channels_first() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::from_size_fn(ImageSize::from([3, 2]), |y, x, c| {
            (100 * c + 10 * y + x) as f32
        });
        let chw = image.to_chw()?;
        assert_eq!(chw.shape(), &[3, 2, 3]);
        for ((c, y, x), &v) in chw.indexed_iter() {
            assert_eq!(v, (100 * c + 10 * y + x) as f32);
        }
        Ok(())
    }
}
