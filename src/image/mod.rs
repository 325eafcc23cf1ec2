pub mod loader;
pub mod preprocessing;
pub mod transforms;
pub mod types;

pub use loader::ImageLoader;
pub use preprocessing::{ImagePreprocessor, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH};
pub use transforms::ImageTransforms;
pub use types::{ColorMode, Dimensions, ImageInfo};
