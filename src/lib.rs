pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod server;

#[cfg(test)]
mod test_support;

pub use crate::config::Config;
pub use error::{ApiError, Result};
pub use logging::{Logger, LoggerConfig, LoggerFactory, SinkLoggerFactory, SERVICE_NAME};
pub use middleware::{get_request_logger, request_logger};
pub use router::build_router;
pub use server::AppState;
