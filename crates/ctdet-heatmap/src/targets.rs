use ndarray::{Array1, Array2, Array3, Axis};

use ctdet_image::ImageSize;

use crate::error::TargetError;
use crate::gaussian::{draw_gaussian, gaussian_radius, DEFAULT_MIN_OVERLAP};

/// Dense training targets of one sample, in output (stride 4) resolution.
///
/// Slot `k` of the per-object arrays belongs to the k-th annotation of the
/// sample. Unused slots stay at zero and are masked out by `reg_mask`.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterNetTargets {
    /// Class heatmaps `[num_classes, out_h, out_w]`, values in `[0, 1]`.
    pub hm: Array3<f32>,
    /// Box size `[max_objs, 2]` as `(w, h)` in output pixels.
    pub wh: Array2<f32>,
    /// Sub-pixel center offset `[max_objs, 2]`.
    pub reg: Array2<f32>,
    /// Flat index `y * out_w + x` of the integer center `[max_objs]`.
    pub ind: Array1<i64>,
    /// 1 for populated slots `[max_objs]`.
    pub reg_mask: Array1<u8>,
}

impl CenterNetTargets {
    /// Allocate zeroed targets.
    ///
    /// # Arguments
    ///
    /// * `num_classes` - The number of heatmap channels.
    /// * `output_size` - The size of the output feature map.
    /// * `max_objs` - The number of object slots.
    pub fn new(num_classes: usize, output_size: ImageSize, max_objs: usize) -> Self {
        Self {
            hm: Array3::zeros((num_classes, output_size.height, output_size.width)),
            wh: Array2::zeros((max_objs, 2)),
            reg: Array2::zeros((max_objs, 2)),
            ind: Array1::zeros(max_objs),
            reg_mask: Array1::zeros(max_objs),
        }
    }

    /// The number of heatmap channels.
    pub fn num_classes(&self) -> usize {
        self.hm.len_of(Axis(0))
    }

    /// The number of object slots.
    pub fn max_objs(&self) -> usize {
        self.reg_mask.len()
    }

    /// The size of the output feature map.
    pub fn output_size(&self) -> ImageSize {
        let (_, height, width) = self.hm.dim();
        ImageSize { width, height }
    }

    /// The number of populated slots.
    pub fn num_objects(&self) -> usize {
        self.reg_mask.iter().filter(|&&m| m == 1).count()
    }

    /// Encode one box into slot `slot` and heatmap channel `class_id`.
    ///
    /// The box `[x1, y1, x2, y2]` is given in output coordinates. It is first
    /// clipped to the feature map; if its width or height is not positive
    /// afterwards nothing is written and `false` is returned. Otherwise a
    /// Gaussian is stamped at the truncated center and the regression targets
    /// of the slot are filled.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot or the class does not exist, or if the box
    /// has non-finite coordinates.
    pub fn encode(
        &mut self,
        slot: usize,
        class_id: usize,
        bbox: [f32; 4],
    ) -> Result<bool, TargetError> {
        if slot >= self.max_objs() {
            return Err(TargetError::SlotOutOfRange(slot, self.max_objs()));
        }
        if class_id >= self.num_classes() {
            return Err(TargetError::ClassOutOfRange(class_id, self.num_classes()));
        }
        if bbox.iter().any(|v| !v.is_finite()) {
            return Err(TargetError::NonFiniteBox(bbox));
        }

        let ImageSize { width, height } = self.output_size();
        let (max_x, max_y) = (width as f32 - 1.0, height as f32 - 1.0);
        // an empty feature map cannot hold any center
        if max_x < 0.0 || max_y < 0.0 {
            return Ok(false);
        }

        let x1 = bbox[0].clamp(0.0, max_x);
        let x2 = bbox[2].clamp(0.0, max_x);
        let y1 = bbox[1].clamp(0.0, max_y);
        let y2 = bbox[3].clamp(0.0, max_y);

        let (w, h) = (x2 - x1, y2 - y1);
        if w <= 0.0 || h <= 0.0 {
            return Ok(false);
        }

        let radius = gaussian_radius(h.ceil(), w.ceil(), DEFAULT_MIN_OVERLAP)
            .trunc()
            .max(0.0) as usize;

        let center = [(x1 + x2) / 2.0, (y1 + y2) / 2.0];
        let center_int = [center[0].trunc() as usize, center[1].trunc() as usize];

        draw_gaussian(
            &mut self.hm.index_axis_mut(Axis(0), class_id),
            center_int,
            radius,
            1.0,
        );

        self.wh[[slot, 0]] = w;
        self.wh[[slot, 1]] = h;
        self.ind[slot] = (center_int[1] * width + center_int[0]) as i64;
        self.reg[[slot, 0]] = center[0] - center_int[0] as f32;
        self.reg[[slot, 1]] = center[1] - center_int[1] as f32;
        self.reg_mask[slot] = 1;

        Ok(true)
    }
}
