use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Metadata of one image of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Unique image id.
    pub id: u64,
    /// File name relative to the image directory.
    pub file_name: String,
    /// Image width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Image height in pixels.
    #[serde(default)]
    pub height: u32,
}

/// One object annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique annotation id.
    pub id: u64,
    /// Id of the image the object belongs to.
    pub image_id: u64,
    /// Box as `[x, y, w, h]` in image pixels.
    pub bbox: [f32; 4],
    /// Raw category id.
    pub category_id: u64,
}

impl Annotation {
    /// The box as `[x_min, y_min, x_max, y_max]`.
    pub fn xyxy(&self) -> [f32; 4] {
        let [x, y, w, h] = self.bbox;
        [x, y, x + w, y + h]
    }
}

/// A category entry of the annotation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Raw category id.
    pub id: u64,
    /// Category name.
    pub name: String,
}

/// Read access to the images and annotations of a dataset.
pub trait AnnotationStore {
    /// All the images, in dataset order.
    fn image_infos(&self) -> &[ImageInfo];

    /// The metadata of an image, if the id is known.
    fn load_image_info(&self, image_id: u64) -> Option<&ImageInfo>;

    /// The ids of the annotations of an image, in file order.
    fn annotation_ids(&self, image_id: u64) -> Vec<u64>;

    /// The annotations with the given ids. Unknown ids are skipped.
    fn load_annotations(&self, ids: &[u64]) -> Vec<&Annotation>;
}

#[derive(Debug, Deserialize)]
struct CocoFile {
    images: Vec<ImageInfo>,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(default)]
    categories: Vec<Category>,
}

/// An [`AnnotationStore`] backed by a COCO style json document.
#[derive(Debug, Clone)]
pub struct CocoAnnotations {
    images: Vec<ImageInfo>,
    annotations: Vec<Annotation>,
    categories: Vec<Category>,
    image_index: HashMap<u64, usize>,
    annotation_index: HashMap<u64, usize>,
    annotations_by_image: HashMap<u64, Vec<u64>>,
}

impl CocoAnnotations {
    /// Parse a COCO json file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if image or
    /// annotation ids are duplicated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CocoFile = serde_json::from_str(&raw).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_parts(file.images, file.annotations, file.categories)?;
        log::info!(
            "loaded {} images and {} annotations from {}",
            store.images.len(),
            store.annotations.len(),
            path.display()
        );
        Ok(store)
    }

    /// Build the store from already parsed records.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Annotations`] if image or annotation ids are
    /// duplicated.
    pub fn from_parts(
        images: Vec<ImageInfo>,
        annotations: Vec<Annotation>,
        categories: Vec<Category>,
    ) -> Result<Self, DatasetError> {
        let mut image_index = HashMap::with_capacity(images.len());
        for (i, info) in images.iter().enumerate() {
            if image_index.insert(info.id, i).is_some() {
                return Err(DatasetError::Annotations(format!(
                    "duplicated image id {}",
                    info.id
                )));
            }
        }

        let mut annotation_index = HashMap::with_capacity(annotations.len());
        let mut annotations_by_image: HashMap<u64, Vec<u64>> = HashMap::new();
        for (i, ann) in annotations.iter().enumerate() {
            if annotation_index.insert(ann.id, i).is_some() {
                return Err(DatasetError::Annotations(format!(
                    "duplicated annotation id {}",
                    ann.id
                )));
            }
            annotations_by_image
                .entry(ann.image_id)
                .or_default()
                .push(ann.id);
        }

        Ok(Self {
            images,
            annotations,
            categories,
            image_index,
            annotation_index,
            annotations_by_image,
        })
    }

    /// The categories declared in the file.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The total number of annotations.
    pub fn num_annotations(&self) -> usize {
        self.annotations.len()
    }
}

impl AnnotationStore for CocoAnnotations {
    fn image_infos(&self) -> &[ImageInfo] {
        &self.images
    }

    fn load_image_info(&self, image_id: u64) -> Option<&ImageInfo> {
        self.image_index
            .get(&image_id)
            .and_then(|&i| self.images.get(i))
    }

    fn annotation_ids(&self, image_id: u64) -> Vec<u64> {
        self.annotations_by_image
            .get(&image_id)
            .cloned()
            .unwrap_or_default()
    }

    fn load_annotations(&self, ids: &[u64]) -> Vec<&Annotation> {
        ids.iter()
            .filter_map(|id| self.annotation_index.get(id))
            .filter_map(|&i| self.annotations.get(i))
            .collect()
    }
}
