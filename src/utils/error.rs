use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Error processing image: {0}")]
    InvalidInput(String),

    #[error("Width and height must be positive integers (got {width}x{height})")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Field required: {0}")]
    MissingField(String),

    #[error("Malformed form data: {0}")]
    MalformedForm(String),

    #[error("File too large, max allowed: {limit} bytes")]
    FileTooLarge { limit: usize },

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("API request failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Response header carrying [`ImageError::error_code`], read back by the request logger.
pub const ERROR_CODE_HEADER: &str = "x-error-code";

impl ImageError {
    /// Undecodable bytes and non-image payloads.
    pub fn decode(err: image::ImageError) -> Self {
        ImageError::InvalidInput(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ImageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ImageError::InvalidDimensions { .. } => StatusCode::BAD_REQUEST,
            ImageError::Base64(_) => StatusCode::BAD_REQUEST,
            ImageError::Json(_) => StatusCode::BAD_REQUEST,
            ImageError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ImageError::MalformedForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ImageError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ImageError::NotFound(_) => StatusCode::NOT_FOUND,
            ImageError::Client(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ImageError::InvalidInput(_) => "INVALID_INPUT",
            ImageError::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
            ImageError::MissingField(_) => "MISSING_FIELD",
            ImageError::MalformedForm(_) => "MALFORMED_FORM",
            ImageError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ImageError::NotFound(_) => "NOT_FOUND",
            ImageError::Encode(_) => "ENCODE_ERROR",
            ImageError::Config(_) => "CONFIG_ERROR",
            ImageError::Io(_) => "IO_ERROR",
            ImageError::Json(_) => "JSON_ERROR",
            ImageError::Base64(_) => "BASE64_DECODE_ERROR",
            ImageError::Client(_) => "CLIENT_ERROR",
            ImageError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let error_response = serde_json::json!({
            "success": false,
            "detail": message,
            "error": {
                "code": self.error_code(),
                "message": message,
            }
        });

        if status.is_server_error() {
            tracing::error!("Request failed: {} ({})", self, status);
        } else {
            tracing::warn!("Request rejected: {} ({})", self, status);
        }

        let mut response = (status, axum::Json(error_response)).into_response();
        response.headers_mut().insert(
            ERROR_CODE_HEADER,
            HeaderValue::from_static(self.error_code()),
        );
        response
    }
}
