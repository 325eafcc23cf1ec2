use crate::utils::error::ImageError;
use crate::Result;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Decoded payloads above this size are rejected before decoding. Over HTTP the
/// request body limit from `ServerConfig::max_request_size` applies first.
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

pub struct ImageLoader;

impl ImageLoader {
    /// Decode an image from a base64 string, with or without a `data:` URL prefix.
    pub fn from_base64(base64_data: &str) -> Result<DynamicImage> {
        let base64_clean = if base64_data.starts_with("data:") {
            base64_data.split(',').nth(1).unwrap_or(base64_data)
        } else {
            base64_data
        };

        let image_bytes = base64::engine::general_purpose::STANDARD.decode(base64_clean.trim())?;

        Self::from_bytes(&image_bytes)
    }

    /// Decode an image from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidInput("empty image data".to_string()));
        }

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::FileTooLarge {
                limit: MAX_IMAGE_BYTES,
            });
        }

        if let Some(format) = Self::detect_format(bytes) {
            tracing::debug!("Decoding {:?} image ({} bytes)", format, bytes.len());
        }

        image::load_from_memory(bytes).map_err(ImageError::decode)
    }

    /// Decode an image from a file on disk.
    pub fn from_path(path: &Path) -> Result<DynamicImage> {
        if !path.exists() {
            return Err(ImageError::NotFound(path.to_path_buf()));
        }

        // sniff the content so a mislabeled extension still decodes
        image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(ImageError::decode)
    }

    /// Write an image, choosing the encoder from the file extension.
    pub fn save(image: &DynamicImage, path: &Path) -> Result<()> {
        image
            .save(path)
            .map_err(|e| ImageError::Encode(format!("{}: {}", path.display(), e)))
    }

    /// Encode as JPEG. JPEG carries no alpha, so the image is flattened to RGB first.
    pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        let rgb = image.to_rgb8();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|e| ImageError::Encode(e.to_string()))?;

        Ok(buffer)
    }

    /// Sniff the container format from magic bytes.
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }
}
