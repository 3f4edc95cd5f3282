// src/router.rs
use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::error::handle_panic;
use crate::handlers::{
    fallback::not_found,
    health::{health_check, metrics_endpoint},
    session::{private_profile, whoami},
};
use crate::middleware::{auth_middleware, metrics_middleware, request_id_middleware, request_logger};
use crate::server::AppState;

/// Build application router.
///
/// Layers run top to bottom on the way in: metrics, panic boundary, CORS,
/// request id, auth, request logger, then the handler.
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/whoami", get(whoami))
        .route("/api/v1/private", get(private_profile))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { metrics_endpoint(handle).await }
            }),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(metrics_middleware))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .layer(middleware::from_fn_with_state(state.clone(), request_logger)),
        )
        .with_state(state)
}
