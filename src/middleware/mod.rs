// src/middleware/mod.rs
pub mod auth;
pub mod logging;
pub mod metrics;
pub mod request_id;

pub use auth::auth_middleware;
pub use logging::{get_request_logger, request_logger, RequestLogger};
pub use self::metrics::metrics_middleware;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
