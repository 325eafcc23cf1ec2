use crate::utils::error::ERROR_CODE_HEADER;
use crate::web::extractors::{RequestId, REQUEST_ID_HEADER};
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Tag each request with an id, log it, and echo the id back to the client.
///
/// The id is written into the request headers so [`RequestId`] in the handlers
/// sees the same value. Rejected requests are logged with their error code.
pub async fn request_logging(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(req.headers());
    if let Ok(value) = HeaderValue::from_str(&request_id.0) {
        req.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let method = req.method().clone();
    let uri = req.uri().clone();
    let start_time = Instant::now();

    tracing::info!("Request started: request_id={} {} {}", request_id.0, method, uri);

    let mut response = next.run(req).await;

    let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    let status = response.status();
    let error_code = response
        .headers()
        .get(ERROR_CODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match error_code {
        Some(code) => tracing::warn!(
            "Request failed: request_id={} {} {} - {} {} - {:.3}ms",
            request_id.0,
            method,
            uri,
            status,
            code,
            elapsed_ms
        ),
        None => tracing::info!(
            "Request completed: request_id={} {} {} - {} - {:.3}ms",
            request_id.0,
            method,
            uri,
            status,
            elapsed_ms
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

const SECURITY_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
];

pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}
