use crate::config::ServerConfig;
use crate::service::Upload;
use crate::utils::error::ImageError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{
        multipart::MultipartError, FromRef, FromRequest, FromRequestParts, Multipart, Request,
    },
    http::{request::Parts, HeaderMap, StatusCode},
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// A multipart form holding at most one `file` part plus plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<Upload>,
    fields: HashMap<String, String>,
}

#[async_trait]
impl<S> FromRequest<S> for UploadForm
where
    ServerConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ImageError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let limit = ServerConfig::from_ref(state).max_request_size;
        let read_error = |context: &str, e: MultipartError| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ImageError::FileTooLarge { limit }
            } else {
                ImageError::MalformedForm(format!("{}: {}", context, e))
            }
        };

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ImageError::MalformedForm(e.body_text()))?;

        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| read_error("Failed to read multipart field", e))?
        {
            let field_name = field.name().unwrap_or("unknown").to_string();

            if field_name == "file" {
                let filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| read_error("Failed to read file data", e))?;

                tracing::debug!("Received file {:?}: {} bytes", filename, data.len());
                form.file = Some(Upload::new(filename, data.to_vec()));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| read_error(&format!("Failed to read field {}", field_name), e))?;
                form.fields.insert(field_name, value);
            }
        }

        Ok(form)
    }
}

impl UploadForm {
    #[cfg(test)]
    fn with_file(file: Upload) -> Self {
        Self {
            file: Some(file),
            fields: HashMap::new(),
        }
    }

    #[cfg(test)]
    fn set_field(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    /// The uploaded file; a missing part is a form error, not an image error.
    pub fn take_file(&mut self) -> Result<Upload, ImageError> {
        self.file
            .take()
            .ok_or_else(|| ImageError::MissingField("file".to_string()))
    }

    pub fn required_int(&self, name: &str) -> Result<i64, ImageError> {
        match self.fields.get(name) {
            Some(value) => Self::parse_int(name, value),
            None => Err(ImageError::MissingField(name.to_string())),
        }
    }

    pub fn optional_int(&self, name: &str, default: i64) -> Result<i64, ImageError> {
        match self.fields.get(name) {
            Some(value) if !value.trim().is_empty() => Self::parse_int(name, value),
            _ => Ok(default),
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }

    fn parse_int(name: &str, value: &str) -> Result<i64, ImageError> {
        value.trim().parse::<i64>().map_err(|_| {
            ImageError::MalformedForm(format!("{} must be an integer, got '{}'", name, value))
        })
    }
}

/// JSON extractor that runs [`Validate`] after deserializing.
///
/// Any body that does not parse into `T` is a 400 [`ImageError::Json`], the same
/// status as a payload that parses but fails validation.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    ServerConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ImageError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let limit = ServerConfig::from_ref(state).max_request_size;
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ImageError::FileTooLarge { limit }
            } else {
                ImageError::MalformedForm(e.body_text())
            }
        })?;

        let value: T = serde_json::from_slice(&body)?;
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ImageError>;
}

/// Body of `POST /predict/base64`.
#[derive(Debug, Deserialize)]
pub struct PredictJsonRequest {
    /// Base64 image data, optionally as a `data:` URL
    pub image: String,

    #[serde(default)]
    pub filename: Option<String>,
}

impl Validate for PredictJsonRequest {
    fn validate(&self) -> Result<(), ImageError> {
        if self.image.trim().is_empty() {
            return Err(ImageError::InvalidInput("Image data cannot be empty".to_string()));
        }

        Ok(())
    }
}

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `X-Request-ID` from the client, or a fresh UUID.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        RequestId(request_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        let mut form = UploadForm::with_file(Upload::new(Some("a.png".to_string()), vec![1, 2, 3]));
        for (name, value) in fields {
            form.set_field(name, value);
        }
        form
    }

    #[test]
    fn test_required_int() {
        let form = form(&[("width", "50"), ("height", " -10 "), ("depth", "abc")]);

        assert_eq!(form.required_int("width").unwrap(), 50);
        assert_eq!(form.required_int("height").unwrap(), -10);
        assert!(matches!(form.required_int("missing"), Err(ImageError::MissingField(_))));
        assert!(matches!(form.required_int("depth"), Err(ImageError::MalformedForm(_))));
    }

    #[test]
    fn test_optional_int_defaults() {
        let form = form(&[("width", "128"), ("height", "")]);

        assert_eq!(form.optional_int("width", 224).unwrap(), 128);
        assert_eq!(form.optional_int("height", 224).unwrap(), 224);
        assert_eq!(form.optional_int("other", 7).unwrap(), 7);
    }

    #[test]
    fn test_take_file_once() {
        let mut form = form(&[]);
        assert_eq!(form.take_file().unwrap().data, vec![1, 2, 3]);
        assert!(matches!(form.take_file(), Err(ImageError::MissingField(_))));
    }

    #[test]
    fn test_flag_parsing() {
        let form = form(&[("return_image", "True"), ("other", "no")]);
        assert!(form.flag("return_image"));
        assert!(!form.flag("other"));
        assert!(!form.flag("absent"));
    }

    #[test]
    fn test_request_id_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "abc-123".parse().unwrap());
        assert_eq!(RequestId::from_headers(&headers).0, "abc-123");

        let generated = RequestId::from_headers(&HeaderMap::new()).0;
        assert!(uuid::Uuid::parse_str(&generated).is_ok());
    }

    async fn parse_json(body: &'static str) -> Result<PredictJsonRequest, ImageError> {
        let request = axum::http::Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let config = crate::Config::default().server_config;

        ValidatedJson::<PredictJsonRequest>::from_request(request, &config)
            .await
            .map(|ValidatedJson(value)| value)
    }

    #[tokio::test]
    async fn test_validated_json_errors() {
        let parsed = parse_json(r#"{"image": "aGk=", "filename": "a.png"}"#).await.unwrap();
        assert_eq!(parsed.filename.as_deref(), Some("a.png"));

        assert!(matches!(parse_json("{not json").await, Err(ImageError::Json(_))));
        assert!(matches!(parse_json(r#"{"filename": "a.png"}"#).await, Err(ImageError::Json(_))));
        assert!(matches!(
            parse_json(r#"{"image": " "}"#).await,
            Err(ImageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_json_request_validation() {
        let empty = PredictJsonRequest {
            image: "  ".to_string(),
            filename: None,
        };
        assert!(matches!(empty.validate(), Err(ImageError::InvalidInput(_))));
    }
}
