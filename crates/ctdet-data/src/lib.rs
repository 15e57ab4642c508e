#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// annotation store abstraction and the COCO json implementation.
pub mod annotations;

/// dataset configuration.
pub mod config;

/// train and test sample builders.
pub mod dataset;

mod error;
pub use error::DatasetError;

/// image file reading.
pub mod io;

/// per dataset constants.
pub mod preset;

/// random generators owned by a data loading worker.
pub mod rng;

pub use annotations::{Annotation, AnnotationStore, Category, CocoAnnotations, ImageInfo};
pub use config::{DatasetConfig, ImgNormCfg};
pub use dataset::{get_border, CtdetDataset, ImageMeta, Mode, Sample, TestSample, TrainSample};
pub use io::{FileImageReader, ImageReader};
pub use preset::Preset;
pub use rng::SampleRng;
