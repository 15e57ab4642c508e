use serde::{Deserialize, Serialize};

/// COCO category ids in the order of the dense class indices.
const COCO_VALID_IDS: [u64; 80] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 27, 28,
    31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55,
    56, 57, 58, 59, 60, 61, 62, 63, 64, 65, 67, 70, 72, 73, 74, 75, 76, 77, 78, 79, 80, 81, 82, 84,
    85, 86, 87, 88, 89, 90,
];

const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic_light",
    "fire_hydrant",
    "stop_sign",
    "parking_meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports_ball",
    "kite",
    "baseball_bat",
    "baseball_glove",
    "skateboard",
    "surfboard",
    "tennis_racket",
    "bottle",
    "wine_glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot_dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted_plant",
    "bed",
    "dining_table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell_phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy_bear",
    "hair_drier",
    "toothbrush",
];

const VOC_CLASSES: [&str; 20] = [
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "pottedplant",
    "sheep",
    "sofa",
    "train",
    "tvmonitor",
];

/// Eigenvalues of the BGR pixel covariance used for PCA lighting noise.
pub const EIG_VAL: [f32; 3] = [0.2141788, 0.01817699, 0.00341571];

/// Eigenvectors of the BGR pixel covariance, one per column.
pub const EIG_VEC: [[f32; 3]; 3] = [
    [-0.58752847, -0.69563484, 0.41340352],
    [-0.5832747, 0.00994535, -0.81221408],
    [-0.56089297, 0.71832671, 0.41158938],
];

/// The dataset flavour a [`crate::CtdetDataset`] is built for.
///
/// Fixes the number of classes, the object capacity, the category id table
/// and whether color augmentation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// MS COCO, 80 classes.
    #[default]
    Coco,
    /// Pascal VOC, 20 classes with ids `1..=20`.
    Voc,
}

impl Preset {
    /// The number of heatmap channels.
    pub fn num_classes(&self) -> usize {
        match self {
            Preset::Coco => 80,
            Preset::Voc => 20,
        }
    }

    /// The number of object slots of a sample.
    pub fn max_objs(&self) -> usize {
        match self {
            Preset::Coco => 128,
            Preset::Voc => 50,
        }
    }

    /// Map a category id to its dense 0-based class index.
    ///
    /// # Example
    ///
    /// ```
    /// use ctdet_data::Preset;
    ///
    /// assert_eq!(Preset::Coco.category_index(13), Some(11));
    /// assert_eq!(Preset::Coco.category_index(12), None);
    /// assert_eq!(Preset::Voc.category_index(20), Some(19));
    /// ```
    pub fn category_index(&self, category_id: u64) -> Option<usize> {
        match self {
            Preset::Coco => COCO_VALID_IDS.iter().position(|&id| id == category_id),
            Preset::Voc => (1..=20).contains(&category_id).then(|| category_id as usize - 1),
        }
    }

    /// The class names in class index order.
    pub fn class_names(&self) -> &'static [&'static str] {
        match self {
            Preset::Coco => &COCO_CLASSES,
            Preset::Voc => &VOC_CLASSES,
        }
    }

    /// Whether the photometric color augmentation runs for training samples.
    pub fn color_aug_enabled(&self) -> bool {
        matches!(self, Preset::Voc)
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Coco => write!(f, "coco"),
            Preset::Voc => write!(f, "voc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_match_class_counts() {
        for preset in [Preset::Coco, Preset::Voc] {
            assert_eq!(preset.class_names().len(), preset.num_classes());
        }
        assert_eq!(COCO_VALID_IDS.len(), 80);
    }

    #[test]
    fn coco_category_mapping() {
        assert_eq!(Preset::Coco.category_index(1), Some(0));
        assert_eq!(Preset::Coco.category_index(90), Some(79));
        assert_eq!(Preset::Coco.category_index(27), Some(24));
        for missing in [0, 12, 26, 29, 30, 45, 66, 68, 69, 71, 83, 91] {
            assert_eq!(Preset::Coco.category_index(missing), None);
        }
        for (index, &id) in COCO_VALID_IDS.iter().enumerate() {
            assert_eq!(Preset::Coco.category_index(id), Some(index));
        }
    }

    #[test]
    fn voc_category_mapping() {
        assert_eq!(Preset::Voc.category_index(0), None);
        assert_eq!(Preset::Voc.category_index(1), Some(0));
        assert_eq!(Preset::Voc.category_index(21), None);
    }

    #[test]
    fn capacities() {
        assert_eq!(Preset::Coco.max_objs(), 128);
        assert_eq!(Preset::Voc.max_objs(), 50);
        assert!(!Preset::Coco.color_aug_enabled());
        assert!(Preset::Voc.color_aug_enabled());
    }

    #[test]
    fn serde_names() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Preset::Voc)?, "\"voc\"");
        assert_eq!(serde_json::from_str::<Preset>("\"coco\"")?, Preset::Coco);
        Ok(())
    }
}
