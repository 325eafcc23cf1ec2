use crate::{
    image::{ImageLoader, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH},
    service::{
        ClassifyAndResizeResult, ImagePipeline, PredictResult, PreprocessResult, ResizeOptions,
        ResizeResult,
    },
    utils::error::ImageError,
    web::{
        extractors::{PredictJsonRequest, RequestId, UploadForm, ValidatedJson},
        AppState,
    },
    Result,
};
use axum::{extract::State, response::Json};
use std::time::Instant;

/// Run CPU-bound image work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ImageError::Internal(format!("Image worker failed: {}", e)))?
}

fn resize_options(form: &UploadForm, width: i64, height: i64) -> ResizeOptions {
    ResizeOptions {
        width,
        height,
        return_image: form.flag("return_image"),
    }
}

/// `POST /predict`
pub async fn predict_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    mut form: UploadForm,
) -> Result<Json<PredictResult>> {
    let start_time = Instant::now();
    let upload = form.take_file()?;

    tracing::info!(
        "Processing predict request: request_id={}, filename={:?}, bytes={}",
        request_id,
        upload.filename,
        upload.data.len()
    );

    let classifier = state.classifier.clone();
    let result = run_blocking(move || ImagePipeline::predict(&upload, classifier.as_ref())).await?;

    tracing::info!(
        "Predict completed: request_id={}, class={}, time={:.3}s",
        request_id,
        result.predicted_class,
        start_time.elapsed().as_secs_f32()
    );

    Ok(Json(result))
}

/// `POST /predict/base64`
pub async fn predict_base64_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedJson(request): ValidatedJson<PredictJsonRequest>,
) -> Result<Json<PredictResult>> {
    tracing::info!(
        "Processing base64 predict request: request_id={}, filename={:?}",
        request_id,
        request.filename
    );

    let classifier = state.classifier.clone();
    let result = run_blocking(move || {
        let image = ImageLoader::from_base64(&request.image)?;
        let predicted_class = classifier.classify(&image)?;

        Ok(PredictResult {
            success: true,
            predicted_class,
            filename: request.filename,
        })
    })
    .await?;

    tracing::info!(
        "Base64 predict completed: request_id={}, class={}",
        request_id,
        result.predicted_class
    );

    Ok(Json(result))
}

/// `POST /resize`
pub async fn resize_handler(
    RequestId(request_id): RequestId,
    mut form: UploadForm,
) -> Result<Json<ResizeResult>> {
    let upload = form.take_file()?;
    let width = form.required_int("width")?;
    let height = form.required_int("height")?;
    let options = resize_options(&form, width, height);

    tracing::info!(
        "Processing resize request: request_id={}, filename={:?}, target={}x{}",
        request_id,
        upload.filename,
        width,
        height
    );

    let result = run_blocking(move || ImagePipeline::resize(&upload, options)).await?;

    Ok(Json(result))
}

/// `POST /preprocess`; width and height default to 224.
pub async fn preprocess_handler(
    RequestId(request_id): RequestId,
    mut form: UploadForm,
) -> Result<Json<PreprocessResult>> {
    let upload = form.take_file()?;
    let width = form.optional_int("width", DEFAULT_TARGET_WIDTH)?;
    let height = form.optional_int("height", DEFAULT_TARGET_HEIGHT)?;
    let options = resize_options(&form, width, height);

    tracing::info!(
        "Processing preprocess request: request_id={}, filename={:?}, target={}x{}",
        request_id,
        upload.filename,
        width,
        height
    );

    let result = run_blocking(move || ImagePipeline::preprocess(&upload, options)).await?;

    Ok(Json(result))
}

/// `POST /classify_and_resize`
pub async fn classify_and_resize_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    mut form: UploadForm,
) -> Result<Json<ClassifyAndResizeResult>> {
    let upload = form.take_file()?;
    let width = form.required_int("width")?;
    let height = form.required_int("height")?;
    let options = resize_options(&form, width, height);

    tracing::info!(
        "Processing classify_and_resize request: request_id={}, filename={:?}, target={}x{}",
        request_id,
        upload.filename,
        width,
        height
    );

    let classifier = state.classifier.clone();
    let result = run_blocking(move || {
        ImagePipeline::classify_and_resize(&upload, options, classifier.as_ref())
    })
    .await?;

    Ok(Json(result))
}
