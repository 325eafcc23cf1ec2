//! Network demo client: ships an image to a running API as JPEG and renders the label.

use crate::image::ImageLoader;
use crate::models::Label;
use crate::service::PredictResult;
use crate::utils::error::ImageError;
use crate::Result;
use image::DynamicImage;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const JPEG_QUALITY: u8 = 95;

/// Deserialized `/predict` payload. The label is kept as a string so an
/// unexpected value from a newer server is still shown.
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub predicted_class: Option<String>,
    pub filename: Option<String>,
}

impl From<PredictResult> for PredictResponse {
    fn from(result: PredictResult) -> Self {
        Self {
            success: result.success,
            predicted_class: Some(result.predicted_class.to_string()),
            filename: result.filename,
        }
    }
}

pub struct DemoClient {
    http: reqwest::Client,
    api_url: String,
}

impl DemoClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.api_url)
    }

    /// POST the image to `/predict` as `image.jpg`.
    pub async fn predict(&self, image: &DynamicImage) -> Result<PredictResponse> {
        let jpeg = ImageLoader::encode_jpeg(image, JPEG_QUALITY)?;
        tracing::debug!("Sending {} byte JPEG to {}", jpeg.len(), self.predict_url());

        let part = Part::bytes(jpeg)
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self.http.post(self.predict_url()).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Internal(format!("{} - {}", status.as_u16(), body)));
        }

        let prediction = response.json::<PredictResponse>().await?;
        if let Some(label) = prediction.predicted_class.as_deref() {
            if Label::from_name(label).is_none() {
                tracing::warn!("API returned unknown label '{}'", label);
            }
        }

        Ok(prediction)
    }

    /// Same as [`predict`](Self::predict) but always returns a line fit for display.
    pub async fn predict_message(&self, image: &DynamicImage) -> String {
        match self.predict(image).await {
            Ok(response) => render_prediction(&response),
            Err(err) => render_error(&err),
        }
    }
}

pub fn render_prediction(response: &PredictResponse) -> String {
    format!(
        "Predicted Class: {}",
        response.predicted_class.as_deref().unwrap_or("Unknown")
    )
}

pub fn render_error(err: &ImageError) -> String {
    format!("Error: {}", describe_error(err))
}

/// Human-readable cause, with the common network failures spelled out.
pub fn describe_error(err: &ImageError) -> String {
    match err {
        ImageError::Client(e) if e.is_timeout() => {
            "Request timeout. The API might be starting up. Please try again.".to_string()
        }
        ImageError::Client(e) if e.is_connect() => {
            "Could not connect to the API. Please check if the API is running.".to_string()
        }
        ImageError::Internal(msg) => msg.clone(),
        other => other.to_string(),
    }
}
