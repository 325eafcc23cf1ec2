use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Browser demo: pick an image, re-encode it as JPEG and post it to `/predict`.
pub async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}
