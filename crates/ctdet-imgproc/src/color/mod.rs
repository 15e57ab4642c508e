mod gray;

pub use gray::{bgr_from_rgb, gray_from_bgr, mean_value};
