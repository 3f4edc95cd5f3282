// src/middleware/logging.rs
//! Request logging with a correlation-id tagged logger.
//!
//! [`request_logger`] builds a [`Logger`] for the request's [`RequestId`],
//! stores it in the request extensions and brackets the rest of the pipeline
//! with a "Request started" and a "Request completed" record. Downstream code
//! picks the logger up again with [`get_request_logger`] or the
//! [`RequestLogger`] extractor.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::USER_AGENT, request::Parts, Extensions},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::error::ApiError;
use crate::logging::Logger;
use crate::middleware::request_id::RequestId;
use crate::server::AppState;

/// Request logging middleware with correlation ID.
///
/// Must run after `request_id_middleware`; without a [`RequestId`] the
/// logger is built with no correlation id. A failing logger factory aborts
/// the request. Panics from downstream are not caught here, so a request
/// that panics gets a start record and no completion record.
pub async fn request_logger(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_owned());

    let logger = state
        .logger_factory
        .create(&state.logger_config, request_id.as_deref())?;
    req.extensions_mut().insert(logger.clone());

    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    logger.info(
        "Request started",
        json!({
            "method": method,
            "path": path,
            "userAgent": user_agent,
        }),
    );

    let response = next.run(req).await;

    let duration_ms = round_millis(start.elapsed());
    logger.info(
        "Request completed",
        json!({
            "method": method,
            "path": path,
            "status": response.status().as_u16(),
            "durationMs": duration_ms,
        }),
    );

    Ok(response)
}

/// Milliseconds rounded to hundredths.
pub fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100_000.0).round() / 100.0
}

/// The request-scoped logger, if `request_logger` has run for this request.
pub fn get_request_logger(extensions: &Extensions) -> Option<Logger> {
    extensions.get::<Logger>().cloned()
}

/// Extractor flavour of [`get_request_logger`]. Never rejects.
#[derive(Debug, Clone)]
pub struct RequestLogger(pub Option<Logger>);

impl<S> FromRequestParts<S> for RequestLogger
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(get_request_logger(&parts.extensions)))
    }
}
