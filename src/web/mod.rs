pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod ui;

use crate::{
    config::ServerConfig,
    image::{DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH},
    models::{Classifier, Label, RandomClassifier},
    utils::error::ImageError,
    Config, Result,
};
use axum::{
    extract::{DefaultBodyLimit, FromRef, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

/// Shared by every handler. The classifier is the only non-config member.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(config: Config, classifier: Arc<dyn Classifier>) -> Self {
        Self { config, classifier }
    }

    /// State with the random placeholder classifier, seeded from config if set.
    pub fn from_config(config: Config) -> Self {
        let classifier = RandomClassifier::from_seed(config.classifier_config.seed);
        Self::new(config, Arc::new(classifier))
    }
}

/// Lets the body extractors read the upload limit they report in `FileTooLarge`.
impl FromRef<AppState> for ServerConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.server_config.clone()
    }
}

pub async fn serve(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;
    let app = create_app(AppState::from_config(config));

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  POST /predict             - Multipart image classification");
    tracing::info!("  POST /predict/base64      - JSON base64 image classification");
    tracing::info!("  POST /resize              - Resize to width x height");
    tracing::info!("  POST /preprocess          - RGB + resize (default 224x224)");
    tracing::info!("  POST /classify_and_resize - Predict and resize in one call");
    tracing::info!("  GET  /                    - Web UI");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /api/info            - Service information");

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ImageError::Internal(format!("Failed to bind to address {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ImageError::Internal(format!("Server failed: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub fn create_app(state: AppState) -> Router {
    let server_config = state.config.server_config.clone();

    Router::new()
        .route("/predict", post(handlers::predict_handler))
        .route("/predict/base64", post(handlers::predict_base64_handler))
        .route("/resize", post(handlers::resize_handler))
        .route("/preprocess", post(handlers::preprocess_handler))
        .route("/classify_and_resize", post(handlers::classify_and_resize_handler))
        .route("/", get(ui::index_handler))
        .route("/health", get(health_handler))
        .route("/api/info", get(info_handler))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(DefaultBodyLimit::max(server_config.max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(server_config.request_timeout)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "Image Classification API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "classifier": state.classifier.name(),
        "labels": Label::names(),
        "preprocess_default_size": {
            "width": DEFAULT_TARGET_WIDTH,
            "height": DEFAULT_TARGET_HEIGHT
        },
        "dev_mode": state.config.dev_mode
    }))
}
