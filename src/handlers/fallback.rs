// src/handlers/fallback.rs
use axum::http::Uri;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::RequestLogger;

/// Fallback for unmatched routes. Logs through the request logger when one
/// is attached and falls back to plain tracing otherwise.
pub async fn not_found(RequestLogger(logger): RequestLogger, uri: Uri) -> ApiError {
    match logger {
        Some(logger) => logger.warn("Route not found", json!({ "path": uri.path() })),
        None => tracing::warn!(path = %uri.path(), "Route not found"),
    }

    ApiError::NotFound(uri.path().to_string())
}
