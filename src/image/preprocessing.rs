use crate::image::transforms::ImageTransforms;
use crate::Result;
use image::DynamicImage;

pub const DEFAULT_TARGET_WIDTH: i64 = 224;
pub const DEFAULT_TARGET_HEIGHT: i64 = 224;

pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Normalize to RGB, then resize to the default 224x224 input size.
    pub fn preprocess_default(image: &DynamicImage) -> Result<DynamicImage> {
        Self::preprocess(image, DEFAULT_TARGET_WIDTH, DEFAULT_TARGET_HEIGHT)
    }

    /// Normalize to RGB, then resize.
    ///
    /// The color step runs first, so a dimension error is only reported for an
    /// image that converted cleanly.
    pub fn preprocess(image: &DynamicImage, width: i64, height: i64) -> Result<DynamicImage> {
        let rgb = ImageTransforms::to_canonical_color(image)?;

        ImageTransforms::resize(&rgb, width, height)
    }
}
