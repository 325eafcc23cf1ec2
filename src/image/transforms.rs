use crate::image::types::{ColorMode, Dimensions, ImageInfo};
use crate::utils::error::ImageError;
use crate::Result;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::borrow::Cow;

/// Largest pixel buffer a single resize may allocate, the decoder's default `max_alloc`.
pub const MAX_RESIZE_BYTES: u64 = 512 * 1024 * 1024;

/// The resampler runs a vertical pass into an `Rgba<f32>` buffer first.
const RESAMPLE_BYTES_PER_PIXEL: u64 = 16;

/// Stateless image operations shared by the HTTP handlers and the CLI.
pub struct ImageTransforms;

impl ImageTransforms {
    /// Rejects images with no pixels; everything a decoder hands back otherwise is usable.
    pub fn validate(image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(ImageError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        Ok(())
    }

    /// Resize to exactly `width` x `height` with Lanczos3 resampling.
    ///
    /// The input is left untouched and the color mode is preserved. Non-positive
    /// dimensions fail with [`ImageError::InvalidDimensions`] before any pixel work.
    pub fn resize(image: &DynamicImage, width: i64, height: i64) -> Result<DynamicImage> {
        Self::validate(image)?;
        let target = Dimensions::new(width, height)?;

        Self::resize_to(image, target)
    }

    /// Resize to an already validated size. Targets whose buffers would exceed
    /// [`MAX_RESIZE_BYTES`] fail with [`ImageError::InvalidInput`] before allocating.
    pub fn resize_to(image: &DynamicImage, target: Dimensions) -> Result<DynamicImage> {
        Self::validate(image)?;
        Self::check_resize_budget(image, target)?;

        tracing::debug!(
            "Resizing {}x{} {} -> {}",
            image.width(),
            image.height(),
            ColorMode::of(image),
            target
        );

        Ok(image.resize_exact(target.width, target.height, FilterType::Lanczos3))
    }

    fn check_resize_budget(image: &DynamicImage, target: Dimensions) -> Result<()> {
        let (width, height) = (u64::from(target.width), u64::from(target.height));
        let output = (width * height).saturating_mul(u64::from(image.color().bytes_per_pixel()));
        let intermediate =
            (u64::from(image.width()) * height).saturating_mul(RESAMPLE_BYTES_PER_PIXEL);
        let required = output.max(intermediate);

        if required > MAX_RESIZE_BYTES {
            return Err(ImageError::InvalidInput(format!(
                "resizing to {} needs {} bytes, limit is {}",
                target, required, MAX_RESIZE_BYTES
            )));
        }

        Ok(())
    }

    /// Convert to 8-bit RGB. An image already in that mode is borrowed back as-is.
    ///
    /// Conversion follows the `image` crate defaults: gray is replicated across the
    /// three channels, alpha is dropped and wide samples are scaled down to 8 bits.
    pub fn to_canonical_color(image: &DynamicImage) -> Result<Cow<'_, DynamicImage>> {
        Self::validate(image)?;

        if ColorMode::of(image).is_canonical() {
            return Ok(Cow::Borrowed(image));
        }

        Ok(Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())))
    }

    /// Width, height and mode of the image, no transformation performed.
    pub fn inspect(image: &DynamicImage) -> Result<ImageInfo> {
        Self::validate(image)?;

        Ok(ImageInfo::of(image))
    }
}
