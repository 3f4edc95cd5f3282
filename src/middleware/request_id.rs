// src/middleware/request_id.rs
use std::fmt;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assigns a request id: the caller's `x-request-id` when it looks sane,
/// a fresh UUID v4 otherwise. The id is echoed on the response.
///
/// The rest of the pipeline runs inside a `request` span carrying the id,
/// so plain `tracing` events from downstream code are correlated too.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| is_valid_request_id(id))
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// 1..=128 characters from `[A-Za-z0-9._-]`.
pub fn is_valid_request_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;
    use axum::{body::Body, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(id): Extension<RequestId>| async move { id.to_string() }),
            )
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    async fn call(header: Option<&str>) -> (String, String) {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        let response = app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();

        let echoed = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (echoed, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn keeps_valid_incoming_id() {
        let (echoed, seen) = call(Some("abc-123")).await;
        assert_eq!(echoed, "abc-123");
        assert_eq!(seen, "abc-123");
    }

    #[tokio::test]
    async fn generates_uuid_when_missing() {
        let (echoed, seen) = call(None).await;
        assert_eq!(echoed, seen);
        assert!(Uuid::parse_str(&seen).is_ok());
    }

    #[tokio::test]
    async fn replaces_malformed_id() {
        let (echoed, _) = call(Some("not valid!")).await;
        assert_ne!(echoed, "not valid!");
        assert!(Uuid::parse_str(&echoed).is_ok());
    }

    #[tokio::test]
    async fn downstream_tracing_events_carry_the_request_id() {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let app = Router::new()
            .route(
                "/",
                get(|| async {
                    tracing::warn!("handler warning");
                    "ok"
                }),
            )
            .layer(axum::middleware::from_fn(request_id_middleware));

        let request = axum::http::Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "rid-9")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap();

        let warning = logs
            .lines()
            .into_iter()
            .find(|line| line["fields"]["message"] == "handler warning")
            .unwrap();
        assert_eq!(warning["level"], "WARN");
        assert_eq!(warning["span"]["name"], "request");
        assert_eq!(warning["span"]["request_id"], "rid-9");
    }

    #[test]
    fn validation_bounds() {
        assert!(is_valid_request_id("a"));
        assert!(is_valid_request_id("req_1.2-3"));
        assert!(!is_valid_request_id(""));
        assert!(!is_valid_request_id(&"x".repeat(129)));
        assert!(is_valid_request_id(&"x".repeat(128)));
        assert!(!is_valid_request_id("semi;colon"));
    }
}
