use ndarray::{s, Array2, ArrayViewMut2, Zip};

/// Minimum IoU a box shifted by the radius must keep with the ground truth.
pub const DEFAULT_MIN_OVERLAP: f32 = 0.7;

/// Compute the Gaussian radius of a box.
///
/// The radius is the largest corner displacement such that a box whose corners
/// move by it still overlaps the original one with at least `min_overlap` IoU.
/// Three configurations are solved as quadratics and the smallest root wins.
///
/// # Arguments
///
/// * `height` - The box height.
/// * `width` - The box width.
/// * `min_overlap` - The minimum IoU, usually [`DEFAULT_MIN_OVERLAP`].
///
/// # Example
///
/// ```
/// use ctdet_heatmap::gaussian_radius;
///
/// let r = gaussian_radius(10.0, 10.0, 0.7);
/// assert!((r - 2.7332).abs() < 1e-3);
/// ```
pub fn gaussian_radius(height: f32, width: f32, min_overlap: f32) -> f32 {
    let (h, w, m) = (height as f64, width as f64, min_overlap as f64);

    let b1 = h + w;
    let c1 = w * h * (1.0 - m) / (1.0 + m);
    let r1 = (b1 + (b1 * b1 - 4.0 * c1).sqrt()) / 2.0;

    let a2 = 4.0;
    let b2 = 2.0 * (h + w);
    let c2 = (1.0 - m) * w * h;
    let r2 = (b2 + (b2 * b2 - 4.0 * a2 * c2).sqrt()) / 2.0;

    let a3 = 4.0 * m;
    let b3 = -2.0 * m * (h + w);
    let c3 = (m - 1.0) * w * h;
    let r3 = (b3 + (b3 * b3 - 4.0 * a3 * c3).sqrt()) / 2.0;

    r1.min(r2).min(r3) as f32
}

/// Create a `diameter x diameter` Gaussian kernel with a peak of 1 at its center.
///
/// Values below the machine epsilon times the peak are flushed to zero.
pub fn gaussian_2d(diameter: usize, sigma: f32) -> Array2<f32> {
    let half = (diameter as f64 - 1.0) / 2.0;
    let two_sigma_sq = 2.0 * sigma as f64 * sigma as f64;

    let kernel = Array2::from_shape_fn((diameter, diameter), |(i, j)| {
        let (y, x) = (i as f64 - half, j as f64 - half);
        (-(x * x + y * y) / two_sigma_sq).exp()
    });

    let max = kernel.iter().cloned().fold(0.0f64, f64::max);
    let threshold = f64::EPSILON * max;

    kernel.mapv(|v| if v < threshold { 0.0 } else { v as f32 })
}

/// Stamp a Gaussian of the given radius on a heatmap channel.
///
/// The kernel has side `2 * radius + 1` and sigma `(2 * radius + 1) / 6`. It is
/// combined with the channel by element-wise maximum, so overlapping objects
/// keep the strongest response. Parts falling outside the channel are cut off.
///
/// # Arguments
///
/// * `heatmap` - One `(rows, cols)` channel of the heatmap.
/// * `center` - The integer center `[x, y]`.
/// * `radius` - The kernel radius.
/// * `k` - The peak value of the stamped kernel.
pub fn draw_gaussian(heatmap: &mut ArrayViewMut2<f32>, center: [usize; 2], radius: usize, k: f32) {
    let diameter = 2 * radius + 1;
    let gaussian = gaussian_2d(diameter, diameter as f32 / 6.0);

    let [x, y] = center;
    let (height, width) = heatmap.dim();
    if x >= width || y >= height {
        return;
    }

    let left = x.min(radius);
    let right = (width - x).min(radius + 1);
    let top = y.min(radius);
    let bottom = (height - y).min(radius + 1);

    let mut masked_heatmap = heatmap.slice_mut(s![y - top..y + bottom, x - left..x + right]);
    let masked_gaussian = gaussian.slice(s![
        radius - top..radius + bottom,
        radius - left..radius + right
    ]);

    Zip::from(&mut masked_heatmap)
        .and(&masked_gaussian)
        .for_each(|h, &g| *h = h.max(g * k));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn radius_known_value() {
        assert_relative_eq!(gaussian_radius(10.0, 10.0, 0.7), 2.7332005, epsilon = 1e-5);
        assert_relative_eq!(gaussian_radius(100.0, 50.0, 0.7), 18.389627, epsilon = 1e-4);
    }

    #[test]
    fn radius_is_symmetric() {
        for (h, w) in [(3.0, 7.0), (12.5, 40.0), (1.0, 128.0)] {
            assert_relative_eq!(
                gaussian_radius(h, w, DEFAULT_MIN_OVERLAP),
                gaussian_radius(w, h, DEFAULT_MIN_OVERLAP),
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn radius_grows_with_box() {
        let mut last = 0.0;
        for side in 1..64 {
            let r = gaussian_radius(side as f32, side as f32, DEFAULT_MIN_OVERLAP);
            assert!(r > last);
            last = r;
        }
    }

    #[test]
    fn kernel_peak_and_symmetry() {
        let kernel = gaussian_2d(7, 7.0 / 6.0);
        assert_eq!(kernel.dim(), (7, 7));
        assert_relative_eq!(kernel[[3, 3]], 1.0);
        for i in 0..7 {
            for j in 0..7 {
                assert_relative_eq!(kernel[[i, j]], kernel[[6 - i, 6 - j]]);
                assert_relative_eq!(kernel[[i, j]], kernel[[j, i]]);
                assert!(kernel[[i, j]] <= 1.0);
            }
        }
    }

    #[test]
    fn kernel_of_radius_zero_is_a_dot() {
        let kernel = gaussian_2d(1, 1.0 / 6.0);
        assert_eq!(kernel, Array2::from_elem((1, 1), 1.0));
    }

    #[test]
    fn draw_puts_peak_at_center() {
        let mut heatmap = Array2::<f32>::zeros((16, 16));
        draw_gaussian(&mut heatmap.view_mut(), [5, 9], 3, 1.0);

        assert_relative_eq!(heatmap[[9, 5]], 1.0);
        assert!(heatmap[[9, 4]] < 1.0 && heatmap[[9, 4]] > 0.0);
        assert_eq!(heatmap[[9, 1]], 0.0);
        assert_eq!(heatmap[[9, 9]], 0.0);
        assert_eq!(heatmap[[5, 5]], 0.0);
    }

    #[test]
    fn draw_combines_with_max() {
        let mut heatmap = Array2::<f32>::zeros((16, 16));
        draw_gaussian(&mut heatmap.view_mut(), [6, 8], 2, 1.0);
        let first = heatmap.clone();
        draw_gaussian(&mut heatmap.view_mut(), [8, 8], 2, 1.0);

        assert_relative_eq!(heatmap[[8, 6]], 1.0);
        assert_relative_eq!(heatmap[[8, 8]], 1.0);
        Zip::from(&heatmap)
            .and(&first)
            .for_each(|&after, &before| assert!(after >= before));

        // stamping the same object twice changes nothing
        let again = heatmap.clone();
        draw_gaussian(&mut heatmap.view_mut(), [8, 8], 2, 1.0);
        assert_eq!(heatmap, again);
    }

    #[test]
    fn draw_truncates_at_edges() {
        let mut heatmap = Array2::<f32>::zeros((8, 10));
        draw_gaussian(&mut heatmap.view_mut(), [0, 0], 4, 1.0);
        assert_relative_eq!(heatmap[[0, 0]], 1.0);
        assert!(heatmap[[4, 4]] > 0.0);

        let mut heatmap = Array2::<f32>::zeros((8, 10));
        draw_gaussian(&mut heatmap.view_mut(), [9, 7], 4, 1.0);
        assert_relative_eq!(heatmap[[7, 9]], 1.0);
        assert!(heatmap[[3, 5]] > 0.0);
    }

    #[test]
    fn draw_outside_is_noop() {
        let mut heatmap = Array2::<f32>::zeros((8, 8));
        draw_gaussian(&mut heatmap.view_mut(), [8, 3], 2, 1.0);
        draw_gaussian(&mut heatmap.view_mut(), [3, 20], 2, 1.0);
        assert!(heatmap.iter().all(|&v| v == 0.0));
    }
}
