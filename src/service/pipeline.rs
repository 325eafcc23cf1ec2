use crate::{
    image::{Dimensions, ImageLoader, ImagePreprocessor, ImageTransforms},
    models::Classifier,
    service::{
        ClassifyAndResizeResult, PredictResult, PreprocessResult, ResizeOptions, ResizeResult,
        Upload,
    },
    Result,
};
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::time::Instant;

/// Decode, transform and summarize a single upload.
///
/// Dimensions are validated before the payload is decoded, so a bad size is
/// reported even when the file is also broken.
pub struct ImagePipeline;

impl ImagePipeline {
    pub fn predict(upload: &Upload, classifier: &dyn Classifier) -> Result<PredictResult> {
        let start_time = Instant::now();

        let image = ImageLoader::from_bytes(&upload.data)?;
        let predicted_class = classifier.classify(&image)?;

        tracing::info!(
            "Predicted '{}' for {:?} with {} classifier in {:.3}ms",
            predicted_class,
            upload.filename,
            classifier.name(),
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        Ok(PredictResult {
            success: true,
            predicted_class,
            filename: upload.filename.clone(),
        })
    }

    pub fn resize(upload: &Upload, options: ResizeOptions) -> Result<ResizeResult> {
        let target = Dimensions::new(options.width, options.height)?;

        let image = ImageLoader::from_bytes(&upload.data)?;
        let original = ImageTransforms::inspect(&image)?;
        let resized = ImageTransforms::resize_to(&image, target)?;
        let new_info = ImageTransforms::inspect(&resized)?;

        tracing::info!(
            "Resized {:?}: {}x{} -> {}",
            upload.filename,
            original.width,
            original.height,
            target
        );

        Ok(ResizeResult {
            success: true,
            filename: upload.filename.clone(),
            original_size: original.into(),
            new_size: new_info.into(),
            mode: original.mode,
            image: Self::maybe_encode(&resized, options.return_image)?,
        })
    }

    pub fn preprocess(upload: &Upload, options: ResizeOptions) -> Result<PreprocessResult> {
        Dimensions::new(options.width, options.height)?;

        let image = ImageLoader::from_bytes(&upload.data)?;
        let original = ImageTransforms::inspect(&image)?;
        let processed = ImagePreprocessor::preprocess(&image, options.width, options.height)?;
        let new_info = ImageTransforms::inspect(&processed)?;

        tracing::info!(
            "Preprocessed {:?}: {}x{} {} -> {}x{} {}",
            upload.filename,
            original.width,
            original.height,
            original.mode,
            new_info.width,
            new_info.height,
            new_info.mode
        );

        Ok(PreprocessResult {
            success: true,
            filename: upload.filename.clone(),
            original_size: original.into(),
            new_size: new_info.into(),
            image: Self::maybe_encode(&processed, options.return_image)?,
        })
    }

    pub fn classify_and_resize(
        upload: &Upload,
        options: ResizeOptions,
        classifier: &dyn Classifier,
    ) -> Result<ClassifyAndResizeResult> {
        let target = Dimensions::new(options.width, options.height)?;

        let image = ImageLoader::from_bytes(&upload.data)?;
        let predicted_class = classifier.classify(&image)?;
        let original = ImageTransforms::inspect(&image)?;
        let resized = ImageTransforms::resize_to(&image, target)?;
        let new_info = ImageTransforms::inspect(&resized)?;

        tracing::info!(
            "Classified {:?} as '{}' and resized to {}",
            upload.filename,
            predicted_class,
            target
        );

        Ok(ClassifyAndResizeResult {
            success: true,
            predicted_class,
            filename: upload.filename.clone(),
            original_size: original.into(),
            new_size: new_info.into(),
            mode: original.mode,
            image: Self::maybe_encode(&resized, options.return_image)?,
        })
    }

    fn maybe_encode(image: &DynamicImage, wanted: bool) -> Result<Option<String>> {
        if !wanted {
            return Ok(None);
        }

        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| crate::utils::error::ImageError::Encode(e.to_string()))?;

        Ok(Some(base64::engine::general_purpose::STANDARD.encode(buffer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ColorMode;
    use crate::models::{Label, RandomClassifier};
    use crate::utils::error::ImageError;

    fn upload(image: &DynamicImage, format: ImageFormat) -> Upload {
        let mut data = Vec::new();
        image.write_to(&mut Cursor::new(&mut data), format).unwrap();
        Upload::new(Some("test.img".to_string()), data)
    }

    fn options(width: i64, height: i64) -> ResizeOptions {
        ResizeOptions {
            width,
            height,
            return_image: false,
        }
    }

    #[test]
    fn test_predict() {
        let upload = upload(&DynamicImage::new_rgb8(100, 100), ImageFormat::Jpeg);
        let result = ImagePipeline::predict(&upload, &RandomClassifier::new()).unwrap();

        assert!(result.success);
        assert!(Label::ALL.contains(&result.predicted_class));
        assert_eq!(result.filename.as_deref(), Some("test.img"));
    }

    #[test]
    fn test_predict_rejects_non_image() {
        let upload = Upload::new(Some("test.txt".to_string()), b"not an image".to_vec());
        let err = ImagePipeline::predict(&upload, &RandomClassifier::new()).unwrap_err();
        assert!(matches!(err, ImageError::InvalidInput(_)));
    }

    #[test]
    fn test_resize_reports_sizes_and_mode() {
        let upload = upload(&DynamicImage::new_rgb8(100, 100), ImageFormat::Png);
        let result = ImagePipeline::resize(&upload, options(50, 40)).unwrap();

        assert_eq!(result.original_size.width, 100);
        assert_eq!(result.new_size.width, 50);
        assert_eq!(result.new_size.height, 40);
        assert_eq!(result.mode, ColorMode::Rgb);
        assert!(result.image.is_none());
    }

    #[test]
    fn test_dimensions_checked_before_decode() {
        let upload = Upload::new(None, b"garbage".to_vec());
        let err = ImagePipeline::resize(&upload, options(-10, 50)).unwrap_err();
        assert!(matches!(err, ImageError::InvalidDimensions { .. }));

        let err = ImagePipeline::preprocess(&upload, options(0, 224)).unwrap_err();
        assert!(matches!(err, ImageError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_preprocess_grayscale() {
        let upload = upload(&DynamicImage::new_luma8(100, 100), ImageFormat::Png);
        let result = ImagePipeline::preprocess(&upload, options(224, 224)).unwrap();

        assert_eq!(result.original_size.mode, ColorMode::L);
        assert_eq!(result.new_size.mode, ColorMode::Rgb);
        assert_eq!((result.new_size.width, result.new_size.height), (224, 224));
    }

    #[test]
    fn test_return_image_is_decodable_png() {
        let upload = upload(&DynamicImage::new_rgba8(30, 30), ImageFormat::Png);
        let result = ImagePipeline::classify_and_resize(
            &upload,
            ResizeOptions {
                width: 12,
                height: 6,
                return_image: true,
            },
            &RandomClassifier::seeded(1),
        )
        .unwrap();

        let encoded = result.image.expect("image requested");
        let decoded = ImageLoader::from_base64(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 6));
        assert_eq!(ColorMode::of(&decoded), ColorMode::Rgba);
        assert_eq!(result.mode, ColorMode::Rgba);
    }
}
