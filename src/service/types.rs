use crate::image::{ColorMode, ImageInfo};
use crate::models::Label;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Size plus the color mode, as reported by `/preprocess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeWithMode {
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
}

impl From<ImageInfo> for Size {
    fn from(info: ImageInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
        }
    }
}

impl From<ImageInfo> for SizeWithMode {
    fn from(info: ImageInfo) -> Self {
        Self {
            width: info.width,
            height: info.height,
            mode: info.mode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResult {
    pub success: bool,
    pub predicted_class: Label,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResizeResult {
    pub success: bool,
    pub filename: Option<String>,
    pub original_size: Size,
    pub new_size: Size,
    pub mode: ColorMode,
    /// Base64 PNG of the output, only when the caller asked for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreprocessResult {
    pub success: bool,
    pub filename: Option<String>,
    pub original_size: SizeWithMode,
    pub new_size: SizeWithMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyAndResizeResult {
    pub success: bool,
    pub predicted_class: Label,
    pub filename: Option<String>,
    pub original_size: Size,
    pub new_size: Size,
    pub mode: ColorMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One uploaded image as it arrives from a front end.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(filename: Option<String>, data: Vec<u8>) -> Self {
        Self { filename, data }
    }
}

/// Knobs shared by the resizing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    pub width: i64,
    pub height: i64,
    pub return_image: bool,
}
