//! Sampling an image at fractional coordinates.

use ctdet_image::Image;

/// How a source pixel is sampled at a fractional position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Weighted mean of the four surrounding pixels.
    #[default]
    Bilinear,
    /// Value of the closest pixel.
    Nearest,
}

/// Sample `image` at column `u` and row `v`.
///
/// `u` and `v` must be non-negative and the image must not be empty. Samples
/// that need a neighbour past the last row or column reuse the border pixel.
pub fn interpolate_pixel<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
) -> [f32; C] {
    match interpolation {
        InterpolationMode::Bilinear => bilinear(image, u, v),
        InterpolationMode::Nearest => nearest(image, u, v),
    }
}

fn pixel_at<const C: usize>(image: &Image<f32, C>, x: usize, y: usize) -> &[f32] {
    let start = (y * image.cols() + x) * C;
    &image.as_slice()[start..start + C]
}

fn nearest<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> [f32; C] {
    let x = (u.round() as usize).min(image.cols() - 1);
    let y = (v.round() as usize).min(image.rows() - 1);
    let mut out = [0.0; C];
    out.copy_from_slice(pixel_at(image, x, y));
    out
}

fn bilinear<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> [f32; C] {
    let x0 = (u as usize).min(image.cols() - 1);
    let y0 = (v as usize).min(image.rows() - 1);
    let x1 = (x0 + 1).min(image.cols() - 1);
    let y1 = (y0 + 1).min(image.rows() - 1);
    let (fx, fy) = (u.fract(), v.fract());

    let (top_l, top_r) = (pixel_at(image, x0, y0), pixel_at(image, x1, y0));
    let (bot_l, bot_r) = (pixel_at(image, x0, y1), pixel_at(image, x1, y1));

    std::array::from_fn(|c| {
        let top = top_l[c] + (top_r[c] - top_l[c]) * fx;
        let bottom = bot_l[c] + (bot_r[c] - bot_l[c]) * fx;
        top + (bottom - top) * fy
    })
}
