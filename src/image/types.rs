use crate::utils::error::ImageError;
use crate::Result;
use image::{ColorType, DynamicImage, GenericImageView};
use serde::{Serialize, Serializer};
use std::fmt;

/// Pixel layout of a decoded image, reported with the usual short mode names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    L,
    La,
    Rgb,
    Rgba,
    L16,
    La16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

impl ColorMode {
    /// The canonical 3-channel mode every preprocessed image ends up in.
    pub const CANONICAL: ColorMode = ColorMode::Rgb;

    pub fn of(image: &DynamicImage) -> Self {
        Self::from(image.color())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::L => "L",
            ColorMode::La => "LA",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
            ColorMode::L16 => "I;16",
            ColorMode::La16 => "LA;16",
            ColorMode::Rgb16 => "RGB;16",
            ColorMode::Rgba16 => "RGBA;16",
            ColorMode::Rgb32F => "RGB;F",
            ColorMode::Rgba32F => "RGBA;F",
        }
    }

    pub fn is_canonical(&self) -> bool {
        *self == Self::CANONICAL
    }
}

impl From<ColorType> for ColorMode {
    fn from(color: ColorType) -> Self {
        match color {
            ColorType::L8 => ColorMode::L,
            ColorType::La8 => ColorMode::La,
            ColorType::Rgb8 => ColorMode::Rgb,
            ColorType::Rgba8 => ColorMode::Rgba,
            ColorType::L16 => ColorMode::L16,
            ColorType::La16 => ColorMode::La16,
            ColorType::Rgb16 => ColorMode::Rgb16,
            ColorType::Rgba16 => ColorMode::Rgba16,
            ColorType::Rgb32F => ColorMode::Rgb32F,
            ColorType::Rgba32F => ColorMode::Rgba32F,
            // ColorType is non-exhaustive; anything new is at least 4 channels wide.
            _ => ColorMode::Rgba,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Validated target size. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Validates caller-supplied values, which may come straight from a form or argv.
    pub fn new(width: i64, height: i64) -> Result<Self> {
        let invalid = || ImageError::InvalidDimensions { width, height };

        if width <= 0 || height <= 0 {
            return Err(invalid());
        }

        Ok(Self {
            width: u32::try_from(width).map_err(|_| invalid())?,
            height: u32::try_from(height).map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of inspecting an image: size and mode, nothing transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
}

impl ImageInfo {
    pub fn of(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            mode: ColorMode::of(image),
        }
    }
}
