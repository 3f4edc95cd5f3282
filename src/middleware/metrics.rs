// src/middleware/metrics.rs
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram, Label};
use std::time::Instant;

/// Metrics middleware to record request count and duration
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;
    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        vec![
            Label::new("method", method.clone()),
            Label::new("status", status),
            Label::new("path", path.clone()),
        ]
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        vec![Label::new("method", method), Label::new("path", path)]
    )
    .record(elapsed);

    response
}

/// Collapses id-like path segments to `{id}` to keep label cardinality bounded.
///
/// - `/health` → `/health`
/// - `/api/v1/presets/42` → `/api/v1/presets/{id}`
/// - `/api/v1/presets/3f1c…-uuid/vote` → `/api/v1/presets/{id}/vote`
pub fn normalize_path(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }

    path.split('/')
        .map(|segment| if is_id_segment(segment) { "{id}" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_id_segment(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    if segment.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    uuid::Uuid::parse_str(segment).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_static_paths() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/api/v1/whoami"), "/api/v1/whoami");
    }

    #[test]
    fn collapses_numeric_ids() {
        assert_eq!(normalize_path("/api/v1/presets/42"), "/api/v1/presets/{id}");
    }

    #[test]
    fn collapses_uuids() {
        assert_eq!(
            normalize_path("/api/v1/presets/67e55044-10b1-426f-9247-bb680e5fe0c8/vote"),
            "/api/v1/presets/{id}/vote"
        );
    }

    #[test]
    fn version_segment_is_not_an_id() {
        assert_eq!(normalize_path("/api/v1"), "/api/v1");
    }
}
