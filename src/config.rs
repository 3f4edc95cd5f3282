// src/config.rs
use std::fmt;
use std::path::Path;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

use crate::logging::LoggerConfig;

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Deployment identity reported on every request log
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub environment: String,
    pub api_version: String,
}

/// Credentials accepted by the auth middleware
#[derive(Deserialize, Clone, Default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub bot_api_secret: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("bot_api_secret", &redact(&self.bot_api_secret))
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // e.g. "info", "debug", "presets_api=debug,tower_http=warn"
    #[serde(default)]
    pub json: bool,
}

/// Global configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub service: ServiceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from `.env`, `config/default.toml` and `APP__*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let settings = Self::defaults()?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        Ok(cfg)
    }

    /// Load config from a single file on top of the built-in defaults
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let settings = Self::defaults()?
            .add_source(config::File::from(path))
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        Ok(cfg)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8787_i64)?
            .set_default("service.environment", "development")?
            .set_default("service.api_version", "v1")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)
    }

    /// Logger identity for request-scoped loggers
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::new(&self.service.environment, &self.service.api_version)
    }
}
