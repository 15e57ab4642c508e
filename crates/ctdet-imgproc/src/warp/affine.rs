use ctdet_image::{Image, ImageError, ImageSize};

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;

/// An error type for the affine geometry functions.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AffineError {
    /// Every scale component must be strictly positive.
    #[error("scale must be strictly positive, got ({0}, {1})")]
    InvalidScale(f32, f32),

    /// An input coordinate, angle or scale is NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// The three correspondence points are collinear.
    #[error("affine correspondence points are collinear")]
    Degenerate,
}

/// Size of the source region mapped onto the destination frame.
///
/// Only the x component drives the mapping built by [`get_affine_transform`],
/// the resulting transform is a similarity (isotropic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// The same extent on both axes.
    Uniform(f32),
    /// Per-axis extent `[sx, sy]`.
    PerAxis([f32; 2]),
}

impl Scale {
    /// The scale broadcast to `[sx, sy]`.
    pub fn xy(&self) -> [f32; 2] {
        match *self {
            Scale::Uniform(s) => [s, s],
            Scale::PerAxis(s) => s,
        }
    }
}

impl From<f32> for Scale {
    fn from(s: f32) -> Self {
        Scale::Uniform(s)
    }
}

impl From<[f32; 2]> for Scale {
    fn from(s: [f32; 2]) -> Self {
        Scale::PerAxis(s)
    }
}

impl std::ops::Mul<f32> for Scale {
    type Output = Scale;

    fn mul(self, factor: f32) -> Scale {
        match self {
            Scale::Uniform(s) => Scale::Uniform(s * factor),
            Scale::PerAxis([sx, sy]) => Scale::PerAxis([sx * factor, sy * factor]),
        }
    }
}

/// Rotate a direction vector by `rot_rad` radians.
fn get_dir(point: [f32; 2], rot_rad: f32) -> [f32; 2] {
    let (sn, cs) = rot_rad.sin_cos();
    [
        point[0] * cs - point[1] * sn,
        point[0] * sn + point[1] * cs,
    ]
}

/// Complete a right-angled triangle: `b + perp(a - b)` with `perp(dx, dy) = (-dy, dx)`.
fn get_third_point(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    let direct = [a[0] - b[0], a[1] - b[1]];
    [b[0] - direct[1], b[1] + direct[0]]
}

fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn triangle_det(p: &[[f32; 2]; 3]) -> f64 {
    det3([
        [p[0][0] as f64, p[0][1] as f64, 1.0],
        [p[1][0] as f64, p[1][1] as f64, 1.0],
        [p[2][0] as f64, p[2][1] as f64, 1.0],
    ])
}

/// Computes the affine transform mapping three source points onto three destination points.
///
/// The 3x3 system is solved in double precision with Cramer's rule.
///
/// # Arguments
///
/// * `src` - Three non-collinear points in the source frame.
/// * `dst` - The three corresponding points in the destination frame.
///
/// # Returns
///
/// The 2x3 affine matrix `[a, b, c, d, e, f]` such that `dst = M · [src, 1]`.
///
/// # Errors
///
/// [`AffineError::Degenerate`] if the source points are collinear,
/// [`AffineError::NonFinite`] if any coordinate is NaN or infinite.
///
/// # Example
///
/// ```
/// use ctdet_imgproc::warp::get_affine_from_points;
///
/// let src = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
/// let dst = [[1.0, 1.0], [3.0, 1.0], [1.0, 3.0]];
/// let m = get_affine_from_points(&src, &dst).unwrap();
/// assert_eq!(m, [2.0, 0.0, 1.0, 0.0, 2.0, 1.0]);
/// ```
pub fn get_affine_from_points(
    src: &[[f32; 2]; 3],
    dst: &[[f32; 2]; 3],
) -> Result<[f32; 6], AffineError> {
    if src.iter().chain(dst.iter()).flatten().any(|v| !v.is_finite()) {
        return Err(AffineError::NonFinite("correspondence points"));
    }

    let det = triangle_det(src);
    if det == 0.0 || !det.is_finite() {
        return Err(AffineError::Degenerate);
    }

    let (x, y) = (
        src.map(|p| p[0] as f64),
        src.map(|p| p[1] as f64),
    );

    let mut m = [0.0f32; 6];
    for axis in 0..2 {
        let t = dst.map(|p| p[axis] as f64);
        let a = det3([[t[0], y[0], 1.0], [t[1], y[1], 1.0], [t[2], y[2], 1.0]]);
        let b = det3([[x[0], t[0], 1.0], [x[1], t[1], 1.0], [x[2], t[2], 1.0]]);
        let c = det3([[x[0], y[0], t[0]], [x[1], y[1], t[1]], [x[2], y[2], t[2]]]);
        m[axis * 3] = (a / det) as f32;
        m[axis * 3 + 1] = (b / det) as f32;
        m[axis * 3 + 2] = (c / det) as f32;
    }

    Ok(m)
}

/// Computes the affine transform that maps a source region onto a destination frame.
///
/// The source region is described by its `center`, its extent `scale` and a rotation
/// `rot` in degrees. Three point correspondences are built on each side: the
/// (shifted) center, a point half the width above it (rotated on the source side,
/// axis-aligned on the destination side) and a third point completing a right
/// triangle. The destination center is `dst_size / 2`.
///
/// # Arguments
///
/// * `center` - Center of the source region `(x, y)`.
/// * `scale` - Extent of the source region.
/// * `rot` - Rotation of the source region in degrees.
/// * `dst_size` - Size of the destination frame.
/// * `shift` - Center offset expressed as a fraction of `scale`.
/// * `inverse` - If true, return the destination to source mapping.
///
/// # Errors
///
/// [`AffineError::InvalidScale`] for a non-positive scale component,
/// [`AffineError::NonFinite`] for NaN or infinite inputs and
/// [`AffineError::Degenerate`] if the destination frame has zero width.
///
/// # Example
///
/// ```
/// use ctdet_image::ImageSize;
/// use ctdet_imgproc::warp::{get_affine_transform, transform_point, Scale};
///
/// // map a 1024 pixels wide region centered at (512, 384) onto a 256x256 frame
/// let m = get_affine_transform(
///     [512.0, 384.0],
///     Scale::Uniform(1024.0),
///     0.0,
///     ImageSize { width: 256, height: 256 },
///     [0.0, 0.0],
///     false,
/// )
/// .unwrap();
///
/// let p = transform_point([512.0, 384.0], &m);
/// assert!((p[0] - 128.0).abs() < 1e-3 && (p[1] - 128.0).abs() < 1e-3);
/// ```
pub fn get_affine_transform(
    center: [f32; 2],
    scale: Scale,
    rot: f32,
    dst_size: ImageSize,
    shift: [f32; 2],
    inverse: bool,
) -> Result<[f32; 6], AffineError> {
    let scale_xy = scale.xy();

    if center.iter().any(|v| !v.is_finite()) {
        return Err(AffineError::NonFinite("center"));
    }
    if shift.iter().any(|v| !v.is_finite()) {
        return Err(AffineError::NonFinite("shift"));
    }
    if !rot.is_finite() {
        return Err(AffineError::NonFinite("rotation"));
    }
    if scale_xy.iter().any(|v| !v.is_finite()) {
        return Err(AffineError::NonFinite("scale"));
    }
    if scale_xy.iter().any(|&v| v <= 0.0) {
        return Err(AffineError::InvalidScale(scale_xy[0], scale_xy[1]));
    }

    let src_w = scale_xy[0];
    let [dst_w, dst_h]: [f32; 2] = dst_size.into();

    let rot_rad = rot.to_radians();
    let src_dir = get_dir([0.0, src_w * -0.5], rot_rad);
    let dst_dir = [0.0, dst_w * -0.5];

    let src0 = [
        center[0] + scale_xy[0] * shift[0],
        center[1] + scale_xy[1] * shift[1],
    ];
    let src1 = [src0[0] + src_dir[0], src0[1] + src_dir[1]];
    let src = [src0, src1, get_third_point(src0, src1)];

    let dst0 = [dst_w * 0.5, dst_h * 0.5];
    let dst1 = [dst0[0] + dst_dir[0], dst0[1] + dst_dir[1]];
    let dst = [dst0, dst1, get_third_point(dst0, dst1)];

    let (from, to) = if inverse { (&dst, &src) } else { (&src, &dst) };

    // the target triangle must be invertible too, otherwise the map collapses
    let det_to = triangle_det(to);
    if det_to == 0.0 || !det_to.is_finite() {
        return Err(AffineError::Degenerate);
    }

    get_affine_from_points(from, to)
}

/// Inverse of the 2x3 affine `m`, so that `transform_point` through `m` and
/// then through the result returns the input point.
///
/// A singular linear part yields the all-zero matrix.
pub fn invert_affine_transform(m: &[f32; 6]) -> [f32; 6] {
    let &[a, b, tx, c, d, ty] = m;
    let det = a * d - b * c;
    if det == 0.0 {
        return [0.0; 6];
    }

    let (ia, ib, ic, id) = (d / det, -b / det, -c / det, a / det);
    [ia, ib, -(ia * tx + ib * ty), ic, id, -(ic * tx + id * ty)]
}

/// Applies an affine transformation to a point: `M · [x, y, 1]ᵗ`.
///
/// # Example
///
/// ```
/// use ctdet_imgproc::warp::transform_point;
///
/// let m = [2.0, 0.0, 1.0, 0.0, 2.0, -1.0];
/// assert_eq!(transform_point([3.0, 4.0], &m), [7.0, 7.0]);
/// ```
pub fn transform_point(point: [f32; 2], m: &[f32; 6]) -> [f32; 2] {
    let [x, y] = point;
    [m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5]]
}

/// Warp `src` into `dst` with the 2x3 affine `m` mapping source to destination.
///
/// Each destination pixel is pulled back through the inverse of `m` and
/// sampled with `interpolation`. Pixels whose preimage falls outside `src`
/// keep their current value, so `dst` doubles as the fill.
///
/// ```
/// use ctdet_image::{Image, ImageSize};
/// use ctdet_imgproc::{interpolation::InterpolationMode, warp::warp_affine};
///
/// let src = Image::<f32, 1>::new(ImageSize::from([2, 1]), vec![1.0, 2.0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(ImageSize::from([6, 2]), -1.0).unwrap();
///
/// // scale by two
/// warp_affine(&src, &mut dst, &[2.0, 0.0, 0.0, 0.0, 2.0, 0.0], InterpolationMode::Nearest).unwrap();
/// assert_eq!(dst.get([0, 0, 0]), Some(&1.0));
/// assert_eq!(dst.get([0, 3, 0]), Some(&2.0));
/// assert_eq!(dst.get([1, 5, 0]), Some(&-1.0));
/// ```
pub fn warp_affine<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f32; 6],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size().is_empty() {
        return Err(ImageError::EmptyImage(src.cols(), src.rows()));
    }

    let m_inv = invert_affine_transform(m);
    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);

    parallel::par_iter_pixels_indexed_mut(dst, |y, x, dst_pixel| {
        let [u, v] = transform_point([x as f32, y as f32], &m_inv);
        if (0.0..src_cols).contains(&u) && (0.0..src_rows).contains(&v) {
            dst_pixel.copy_from_slice(&interpolate_pixel(src, u, v, interpolation));
        }
    });

    Ok(())
}
