use ndarray::Array3;
use rand::Rng;
use serde::Serialize;

use ctdet_heatmap::CenterNetTargets;
use ctdet_image::{Image, ImageError, ImageSize};
use ctdet_imgproc::{
    augment::{color_aug, random_color_order},
    flip::{horizontal_flip, horizontal_flip_box},
    interpolation::InterpolationMode,
    normalize::normalize_mean_std,
    resize::resize_fast,
    warp::{get_affine_transform, transform_point, warp_affine, Scale},
};

use crate::annotations::{AnnotationStore, CocoAnnotations, ImageInfo};
use crate::config::DatasetConfig;
use crate::error::DatasetError;
use crate::io::{FileImageReader, ImageReader};
use crate::preset::{EIG_VAL, EIG_VEC};
use crate::rng::SampleRng;

/// Border kept free of crop centers, before shrinking for small images.
const CROP_BORDER: usize = 128;

/// Random scale factors `0.6, 0.7, ..., 1.3`.
const SCALE_FACTORS: [f32; 8] = [0.6, 0.7, 0.8, 0.9, 1.0, 1.1, 1.2, 1.3];

/// Ratio between the network input and the output feature map.
const DOWN_RATIO: usize = 4;

/// Shrink `border` by powers of two until it leaves room for a crop center.
///
/// Returns the largest `border / 2^k` (integer division) such that
/// `size - border / 2^k > border / 2^k`.
///
/// # Example
///
/// ```
/// use ctdet_data::get_border;
///
/// assert_eq!(get_border(128, 512), 128);
/// assert_eq!(get_border(128, 200), 64);
/// assert_eq!(get_border(128, 100), 32);
/// ```
pub fn get_border(border: usize, size: usize) -> usize {
    let mut i = 1;
    while border / i > 0 && size <= 2 * (border / i) {
        i *= 2;
    }
    border / i
}

/// A training sample.
#[derive(Debug, Clone)]
pub struct TrainSample {
    /// Normalized input `[3, input_h, input_w]`, BGR.
    pub img: Array3<f32>,
    /// Heatmap and regression targets.
    pub targets: CenterNetTargets,
}

/// Metadata needed to map test predictions back to the image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMeta {
    /// Center of the source region.
    pub center: [f32; 2],
    /// Extent `[w, h]` of the source region.
    pub scale: [f32; 2],
    /// Height of the output feature map.
    pub out_height: usize,
    /// Width of the output feature map.
    pub out_width: usize,
    /// Image id.
    pub img_id: u64,
    /// Normalization means.
    pub mean: [f32; 3],
    /// Normalization standard deviations.
    pub std: [f32; 3],
}

/// A test sample.
#[derive(Debug, Clone)]
pub struct TestSample {
    /// Normalized input `[3, input_h, input_w]`, BGR.
    pub img: Array3<f32>,
    /// Inverse mapping metadata.
    pub meta: ImageMeta,
}

/// Which pipeline builds a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Random augmentation and target encoding.
    Train,
    /// Deterministic single scale preprocessing.
    Test,
}

/// A sample built by [`CtdetDataset::prepare`].
#[derive(Debug, Clone)]
pub enum Sample {
    /// A training sample.
    Train(TrainSample),
    /// A test sample.
    Test(TestSample),
}

/// A detection dataset producing CenterNet style samples.
///
/// The dataset only reads from its store and reader, so it can be shared
/// between workers; all the randomness comes from the [`SampleRng`] passed to
/// each call.
pub struct CtdetDataset<S = CocoAnnotations, R = FileImageReader> {
    config: DatasetConfig,
    store: S,
    reader: R,
}

impl CtdetDataset {
    /// Open a dataset from a COCO json annotation file, reading images from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the annotation
    /// file cannot be loaded.
    pub fn from_coco_file(
        config: DatasetConfig,
        ann_file: impl AsRef<std::path::Path>,
    ) -> Result<Self, DatasetError> {
        let store = CocoAnnotations::from_json_file(ann_file)?;
        Self::new(config, store, FileImageReader)
    }
}

impl<S: AnnotationStore, R: ImageReader> CtdetDataset<S, R> {
    /// Create a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] if the configuration is invalid.
    pub fn new(config: DatasetConfig, store: S, reader: R) -> Result<Self, DatasetError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            reader,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// The annotation store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The number of images.
    pub fn len(&self) -> usize {
        self.store.image_infos().len()
    }

    /// Whether the dataset has no image.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the sample at `index` with the given pipeline.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare_train_img`] and [`Self::prepare_test_img`].
    pub fn prepare(
        &self,
        index: usize,
        mode: Mode,
        rng: &mut SampleRng,
    ) -> Result<Sample, DatasetError> {
        match mode {
            Mode::Train => self.prepare_train_img(index, rng).map(Sample::Train),
            Mode::Test => self.prepare_test_img(index).map(Sample::Test),
        }
    }

    fn image_info(&self, index: usize) -> Result<&ImageInfo, DatasetError> {
        let infos = self.store.image_infos();
        let id = infos
            .get(index)
            .map(|info| info.id)
            .ok_or(DatasetError::IndexOutOfRange(index, infos.len()))?;
        self.store
            .load_image_info(id)
            .ok_or(DatasetError::MissingImage(id))
    }

    fn read_image(&self, info: &ImageInfo) -> Result<Image<u8, 3>, DatasetError> {
        let image = self
            .reader
            .read_bgr(&self.config.img_prefix.join(&info.file_name))?;
        if image.size().is_empty() {
            return Err(ImageError::EmptyImage(image.cols(), image.rows()).into());
        }
        Ok(image)
    }

    /// Size of the network input when the resolution is kept.
    fn padded_size(&self, size: ImageSize) -> ImageSize {
        let d = self.config.size_divisor;
        ImageSize {
            width: (size.width | d) + 1,
            height: (size.height | d) + 1,
        }
    }

    /// Warp, scale to `[0, 1]` and normalize into a `[3, H, W]` array.
    fn warp_input<G: Rng>(
        &self,
        image: &Image<u8, 3>,
        trans: &[f32; 6],
        input_size: ImageSize,
        color_rng: Option<(&mut G, &mut G)>,
    ) -> Result<Array3<f32>, DatasetError> {
        let src = image.cast_and_scale::<f32>(1.0 / 255.0)?;
        let mut inp = Image::<f32, 3>::from_size_val(input_size, 0.0)?;
        warp_affine(&src, &mut inp, trans, InterpolationMode::Bilinear)?;

        if let Some((augment, color)) = color_rng {
            let order = random_color_order(augment);
            color_aug(&mut inp, color, &order, &EIG_VAL, &EIG_VEC)?;
        }

        let norm = &self.config.img_norm_cfg;
        let mut out = Image::<f32, 3>::from_size_val(input_size, 0.0)?;
        normalize_mean_std(&inp, &mut out, &norm.mean, &norm.std)?;

        Ok(out.to_chw()?)
    }

    /// Build a training sample with random crop, scale, flip and color jitter.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped in [`DatasetError::Sample`] with the image id,
    /// except an out of range `index`.
    pub fn prepare_train_img(
        &self,
        index: usize,
        rng: &mut SampleRng,
    ) -> Result<TrainSample, DatasetError> {
        let info = self.image_info(index)?;
        self.build_train_sample(info, rng)
            .map_err(|e| e.in_sample(info.id))
    }

    fn build_train_sample(
        &self,
        info: &ImageInfo,
        rng: &mut SampleRng,
    ) -> Result<TrainSample, DatasetError> {
        let preset = self.config.preset;
        let max_objs = preset.max_objs();

        let mut image = self.read_image(info)?;
        let anns = self
            .store
            .load_annotations(&self.store.annotation_ids(info.id));
        let num_objs = anns.len().min(max_objs);

        let (width, height) = (image.width(), image.height());

        let (scale, input_size) = if self.config.keep_res {
            let input_size = self.padded_size(image.size());
            let scale = Scale::PerAxis([input_size.width as f32, input_size.height as f32]);
            (scale, input_size)
        } else {
            let [input_h, input_w] = self.config.img_scale;
            let input_size = ImageSize {
                width: input_w,
                height: input_h,
            };
            (Scale::Uniform(width.max(height) as f32), input_size)
        };

        let factor = SCALE_FACTORS[rng.augment.random_range(0..SCALE_FACTORS.len())];
        let scale = scale * factor;

        let w_border = get_border(CROP_BORDER, width);
        let h_border = get_border(CROP_BORDER, height);
        let mut center = [
            rng.augment.random_range(w_border..width - w_border) as f32,
            rng.augment.random_range(h_border..height - h_border) as f32,
        ];

        let flipped = rng.augment.random::<f32>() < self.config.flip_ratio;
        if flipped {
            image = horizontal_flip(&image)?;
            center[0] = width as f32 - center[0] - 1.0;
        }

        let trans_input =
            get_affine_transform(center, scale, 0.0, input_size, [0.0, 0.0], false)?;
        let color_rng = preset
            .color_aug_enabled()
            .then_some((&mut rng.augment, &mut rng.color));
        let img = self.warp_input(&image, &trans_input, input_size, color_rng)?;

        let output_size = ImageSize {
            width: input_size.width / DOWN_RATIO,
            height: input_size.height / DOWN_RATIO,
        };
        let trans_output =
            get_affine_transform(center, scale, 0.0, output_size, [0.0, 0.0], false)?;

        let mut targets = CenterNetTargets::new(preset.num_classes(), output_size, max_objs);
        let mut encoded = 0;
        for (slot, ann) in anns.iter().take(num_objs).enumerate() {
            let class_id = preset
                .category_index(ann.category_id)
                .ok_or(DatasetError::UnknownCategory(ann.category_id))?;

            let mut bbox = ann.xyxy();
            if flipped {
                bbox = horizontal_flip_box(bbox, width);
            }

            let [x1, y1] = transform_point([bbox[0], bbox[1]], &trans_output);
            let [x2, y2] = transform_point([bbox[2], bbox[3]], &trans_output);

            if targets.encode(slot, class_id, [x1, y1, x2, y2])? {
                encoded += 1;
            }
        }

        log::debug!(
            "image {}: {}x{} -> {}x{}, scale {:?}, flipped {}, objects {} encoded / {} kept / {} dropped",
            info.id,
            width,
            height,
            input_size.width,
            input_size.height,
            scale.xy(),
            flipped,
            encoded,
            num_objs,
            anns.len() - num_objs,
        );

        Ok(TrainSample { img, targets })
    }

    /// Build the single scale test sample of an image.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped in [`DatasetError::Sample`] with the image id,
    /// except an out of range `index`.
    pub fn prepare_test_img(&self, index: usize) -> Result<TestSample, DatasetError> {
        self.prepare_test_img_scaled(index, 1.0)
    }

    /// Build the test sample of an image resized by `scale`.
    ///
    /// The resized image is padded to `(dim | size_divisor) + 1` around its
    /// center.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped in [`DatasetError::Sample`] with the image id,
    /// except an out of range `index`.
    pub fn prepare_test_img_scaled(
        &self,
        index: usize,
        scale: f32,
    ) -> Result<TestSample, DatasetError> {
        let info = self.image_info(index)?;
        self.build_test_sample(info, scale)
            .map_err(|e| e.in_sample(info.id))
    }

    fn build_test_sample(&self, info: &ImageInfo, scale: f32) -> Result<TestSample, DatasetError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DatasetError::Config(format!(
                "test scale must be strictly positive, got {scale}"
            )));
        }

        let image = self.read_image(info)?;

        let new_size = ImageSize {
            width: (image.width() as f32 * scale) as usize,
            height: (image.height() as f32 * scale) as usize,
        };
        let mut resized = Image::<u8, 3>::from_size_val(new_size, 0)?;
        resize_fast(&image, &mut resized, InterpolationMode::Bilinear)?;

        let input_size = self.padded_size(new_size);
        let center = [
            (new_size.width / 2) as f32,
            (new_size.height / 2) as f32,
        ];
        let scale_xy = [input_size.width as f32, input_size.height as f32];

        let trans_input = get_affine_transform(
            center,
            Scale::PerAxis(scale_xy),
            0.0,
            input_size,
            [0.0, 0.0],
            false,
        )?;
        let img = self.warp_input::<rand::rngs::StdRng>(&resized, &trans_input, input_size, None)?;

        let norm = &self.config.img_norm_cfg;
        let meta = ImageMeta {
            center,
            scale: scale_xy,
            out_height: input_size.height / DOWN_RATIO,
            out_width: input_size.width / DOWN_RATIO,
            img_id: info.id,
            mean: norm.mean,
            std: norm.std,
        };

        log::debug!(
            "image {}: test input {}x{}, output {}x{}",
            info.id,
            input_size.width,
            input_size.height,
            meta.out_width,
            meta.out_height,
        );

        Ok(TestSample { img, meta })
    }
}
