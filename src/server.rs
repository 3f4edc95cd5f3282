// src/server.rs
use std::sync::Arc;

use crate::{
    auth::Authenticator,
    config::Config,
    logging::{LoggerConfig, LoggerFactory},
};

/// Shared application state handed to middleware and handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub logger_config: LoggerConfig,
    pub logger_factory: Arc<dyn LoggerFactory>,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(config: Config, logger_factory: Arc<dyn LoggerFactory>) -> Self {
        Self {
            logger_config: config.logger_config(),
            authenticator: Authenticator::from_config(&config.auth),
            logger_factory,
            config,
        }
    }
}
