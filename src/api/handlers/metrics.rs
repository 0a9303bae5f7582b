use axum::{http::StatusCode, response::IntoResponse};
use prometheus::TextEncoder;

/// Prometheus metrics in text exposition format
pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&prometheus::gather()) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode metrics: {}", e),
        ),
    }
}
