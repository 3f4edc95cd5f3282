// src/handlers/health.rs
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;

use crate::server::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": state.logger_config.service_name,
        "environment": state.logger_config.environment,
        "apiVersion": state.logger_config.api_version,
    }))
}

/// GET /metrics
pub async fn metrics_endpoint(handle: Option<PrometheusHandle>) -> Response {
    match handle {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
