use std::path::PathBuf;

use ctdet_heatmap::TargetError;
use ctdet_image::ImageError;
use ctdet_imgproc::warp::AffineError;

/// An error type for the dataset module.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// Error when a file cannot be opened or read.
    #[error("Failed to read {path}. {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Error when an image file cannot be decoded.
    #[error("Failed to decode the image {path}. {source}")]
    Decode {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: image::ImageError,
    },

    /// Error when a json file cannot be parsed.
    #[error("Failed to parse {path}. {source}")]
    Json {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Error when an annotation category is not part of the preset.
    #[error("Unknown category id {0}")]
    UnknownCategory(u64),

    /// Error when the affine transform cannot be built.
    #[error("Invalid geometry. {0}")]
    InvalidGeometry(#[from] AffineError),

    /// Error from an image operation.
    #[error("Image error. {0}")]
    Image(#[from] ImageError),

    /// Error when encoding the targets.
    #[error("Target error. {0}")]
    Target(#[from] TargetError),

    /// Error when the sample index is not in the dataset.
    #[error("Index {0} is out of range, dataset length is {1}")]
    IndexOutOfRange(usize, usize),

    /// Error when an image id has no image info.
    #[error("Image id {0} is not in the annotation store")]
    MissingImage(u64),

    /// Error when the configuration holds invalid values.
    #[error("Invalid configuration. {0}")]
    Config(String),

    /// Error when the annotation store is inconsistent.
    #[error("Invalid annotations. {0}")]
    Annotations(String),

    /// Error while building the sample of an image.
    #[error("Failed to prepare image {image_id}. {source}")]
    Sample {
        /// The image id of the sample.
        image_id: u64,
        /// The underlying error.
        #[source]
        source: Box<DatasetError>,
    },
}

impl DatasetError {
    /// Attach the image id of the sample being built.
    pub(crate) fn in_sample(self, image_id: u64) -> Self {
        match self {
            DatasetError::Sample { .. } => self,
            source => DatasetError::Sample {
                image_id,
                source: Box::new(source),
            },
        }
    }
}
