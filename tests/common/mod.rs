// Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use presets_api::config::{AuthConfig, Config, LoggingConfig, ServerConfig, ServiceConfig};
use presets_api::logging::{MemorySink, SinkLoggerFactory};
use presets_api::AppState;
use serde_json::{json, Value};

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const BOT_SECRET: &str = "test-bot-secret";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        service: ServiceConfig {
            environment: "prod".to_string(),
            api_version: "v1".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: Some(JWT_SECRET.to_string()),
            bot_api_secret: Some(BOT_SECRET.to_string()),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            json: false,
        },
    }
}

/// App state whose loggers all write into the returned sink.
pub fn recording_state() -> (AppState, MemorySink) {
    let sink = MemorySink::new();
    let state = AppState::new(test_config(), Arc::new(SinkLoggerFactory::new(sink.clone())));
    (state, sink)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// True when `value` has no more than two decimals.
pub fn is_hundredths(value: f64) -> bool {
    ((value * 100.0).round() - value * 100.0).abs() < 1e-6
}

/// HS256 token for `sub`, signed with the test JWT secret.
pub fn mint_token(sub: &str, username: Option<&str>) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": sub,
        "username": username,
        "iat": now.timestamp(),
        "exp": (now + Duration::hours(1)).timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}
