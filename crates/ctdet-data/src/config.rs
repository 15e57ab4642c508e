use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::preset::Preset;

/// Per channel normalization statistics, in BGR order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImgNormCfg {
    /// Channel means of images scaled to `[0, 1]`.
    pub mean: [f32; 3],
    /// Channel standard deviations of images scaled to `[0, 1]`.
    pub std: [f32; 3],
}

impl Default for ImgNormCfg {
    fn default() -> Self {
        Self {
            mean: [0.408, 0.447, 0.470],
            std: [0.289, 0.274, 0.278],
        }
    }
}

/// Configuration of a [`crate::CtdetDataset`].
///
/// Every field has a default, so a json file only needs the keys it changes.
///
/// # Example
///
/// ```
/// use ctdet_data::{DatasetConfig, Preset};
///
/// let config = DatasetConfig::default()
///     .with_img_prefix("data/coco/train2017")
///     .with_preset(Preset::Voc)
///     .with_flip_ratio(0.0);
///
/// assert_eq!(config.img_scale, [512, 512]);
/// assert_eq!(config.preset, Preset::Voc);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Directory the image file names are relative to.
    pub img_prefix: PathBuf,
    /// Network input size `[height, width]` when `keep_res` is off.
    pub img_scale: [usize; 2],
    /// Input dimensions are rounded up to `(dim | size_divisor) + 1`.
    pub size_divisor: usize,
    /// Normalization statistics.
    pub img_norm_cfg: ImgNormCfg,
    /// Keep the image resolution instead of warping to `img_scale`.
    pub keep_res: bool,
    /// Dataset flavour.
    pub preset: Preset,
    /// Probability of a horizontal flip for training samples.
    pub flip_ratio: f32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            img_prefix: PathBuf::new(),
            img_scale: [512, 512],
            size_divisor: 31,
            img_norm_cfg: ImgNormCfg::default(),
            keep_res: false,
            preset: Preset::default(),
            flip_ratio: 0.5,
        }
    }
}

impl DatasetConfig {
    /// Load a configuration from a json file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it holds
    /// invalid values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), DatasetError> {
        // the output map is a quarter of the input
        if self.img_scale.iter().any(|&v| v < 4) {
            return Err(DatasetError::Config(format!(
                "img_scale must be at least 4 on each axis, got {:?}",
                self.img_scale
            )));
        }
        if self.img_norm_cfg.std.iter().any(|&v| v.is_nan() || v <= 0.0) {
            return Err(DatasetError::Config(format!(
                "img_norm_cfg.std must be strictly positive, got {:?}",
                self.img_norm_cfg.std
            )));
        }
        if self.img_norm_cfg.mean.iter().any(|v| !v.is_finite()) {
            return Err(DatasetError::Config(format!(
                "img_norm_cfg.mean must be finite, got {:?}",
                self.img_norm_cfg.mean
            )));
        }
        if !(0.0..=1.0).contains(&self.flip_ratio) {
            return Err(DatasetError::Config(format!(
                "flip_ratio must be in [0, 1], got {}",
                self.flip_ratio
            )));
        }
        Ok(())
    }

    /// Set the image directory.
    pub fn with_img_prefix(mut self, img_prefix: impl Into<PathBuf>) -> Self {
        self.img_prefix = img_prefix.into();
        self
    }

    /// Set the network input size `[height, width]`.
    pub fn with_img_scale(mut self, img_scale: [usize; 2]) -> Self {
        self.img_scale = img_scale;
        self
    }

    /// Set the size divisor.
    pub fn with_size_divisor(mut self, size_divisor: usize) -> Self {
        self.size_divisor = size_divisor;
        self
    }

    /// Set the normalization statistics.
    pub fn with_img_norm_cfg(mut self, img_norm_cfg: ImgNormCfg) -> Self {
        self.img_norm_cfg = img_norm_cfg;
        self
    }

    /// Keep the image resolution.
    pub fn with_keep_res(mut self, keep_res: bool) -> Self {
        self.keep_res = keep_res;
        self
    }

    /// Set the dataset flavour.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// Set the flip probability.
    pub fn with_flip_ratio(mut self, flip_ratio: f32) -> Self {
        self.flip_ratio = flip_ratio;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, r#"{{ "preset": "voc", "keep_res": true, "img_prefix": "images" }}"#)?;

        let config = DatasetConfig::from_json_file(file.path())?;
        assert_eq!(config.preset, Preset::Voc);
        assert!(config.keep_res);
        assert_eq!(config.img_prefix, PathBuf::from("images"));
        assert_eq!(config.img_scale, [512, 512]);
        assert_eq!(config.size_divisor, 31);
        assert_eq!(config.flip_ratio, 0.5);
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = DatasetConfig::default().with_flip_ratio(1.5);
        assert!(matches!(config.validate(), Err(DatasetError::Config(_))));

        let config = DatasetConfig::default().with_img_scale([2, 512]);
        assert!(matches!(config.validate(), Err(DatasetError::Config(_))));

        let config = DatasetConfig::default().with_img_norm_cfg(ImgNormCfg {
            mean: [0.0; 3],
            std: [1.0, 0.0, 1.0],
        });
        assert!(matches!(config.validate(), Err(DatasetError::Config(_))));

        assert!(DatasetConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = DatasetConfig::from_json_file("/nonexistent/ctdet.json");
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }

    #[test]
    fn malformed_file_is_json_error() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{{ not json")?;
        let result = DatasetConfig::from_json_file(file.path());
        assert!(matches!(result, Err(DatasetError::Json { .. })));
        Ok(())
    }
}
