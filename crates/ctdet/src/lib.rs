#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use ctdet_image as image;

#[doc(inline)]
pub use ctdet_imgproc as imgproc;

#[doc(inline)]
pub use ctdet_heatmap as heatmap;

#[doc(inline)]
pub use ctdet_data as data;
