// src/logging.rs
//! Request-scoped structured logging.
//!
//! A [`Logger`] is built per request by a [`LoggerFactory`] and tags every
//! record it emits with the service identity and the request's correlation
//! id. Records go to a [`LogSink`]: [`TracingSink`] in production,
//! [`MemorySink`] when the records need to be inspected.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Service name stamped on every request-scoped record.
pub const SERVICE_NAME: &str = "xivdyetools-presets-api";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("logger config has an empty service name")]
    MissingServiceName,

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Identity of the service a logger reports for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub environment: String,
    pub api_version: String,
    pub service_name: String,
}

impl LoggerConfig {
    pub fn new(environment: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            api_version: api_version.into(),
            service_name: SERVICE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One structured log line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub service: String,
    pub environment: String,
    pub api_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub fields: Map<String, Value>,
}

impl LogRecord {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Destination for records produced by a [`Logger`].
pub trait LogSink: Send + Sync {
    fn emit(&self, record: LogRecord);
}

/// Forwards records to the global `tracing` subscriber.
///
/// The request fields `method`, `path`, `userAgent`, `status` and
/// `durationMs` become the tracing fields `method`, `path`, `user_agent`,
/// `status` and `duration_ms`. Any other record field ends up in `extra`,
/// a JSON-encoded object string. A missing correlation id is written as `-`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

/// Record fields split into typed request fields and the JSON remainder.
struct SplitFields {
    method: Option<String>,
    path: Option<String>,
    user_agent: Option<String>,
    status: Option<u64>,
    duration_ms: Option<f64>,
    extra: Option<String>,
}

impl SplitFields {
    fn from_map(mut fields: Map<String, Value>) -> Self {
        if fields.get("userAgent").is_some_and(Value::is_null) {
            fields.remove("userAgent");
        }

        let method = take(&mut fields, "method", |v| v.as_str().map(str::to_owned));
        let path = take(&mut fields, "path", |v| v.as_str().map(str::to_owned));
        let user_agent = take(&mut fields, "userAgent", |v| v.as_str().map(str::to_owned));
        let status = take(&mut fields, "status", Value::as_u64);
        let duration_ms = take(&mut fields, "durationMs", Value::as_f64);
        let extra = (!fields.is_empty()).then(|| Value::Object(fields).to_string());

        Self {
            method,
            path,
            user_agent,
            status,
            duration_ms,
            extra,
        }
    }
}

/// Removes `key` only when `read` accepts its value.
fn take<T>(fields: &mut Map<String, Value>, key: &str, read: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = fields.get(key).and_then(read)?;
    fields.remove(key);
    Some(value)
}

macro_rules! forward {
    ($level:ident, $record:ident, $correlation_id:ident, $split:ident) => {
        tracing::$level!(
            service = %$record.service,
            environment = %$record.environment,
            api_version = %$record.api_version,
            correlation_id = %$correlation_id,
            method = $split.method.as_deref(),
            path = $split.path.as_deref(),
            user_agent = $split.user_agent.as_deref(),
            status = $split.status,
            duration_ms = $split.duration_ms,
            extra = $split.extra.as_deref(),
            "{}",
            $record.message
        )
    };
}

impl LogSink for TracingSink {
    fn emit(&self, record: LogRecord) {
        let split = SplitFields::from_map(record.fields);
        let correlation_id = record.correlation_id.as_deref().unwrap_or("-");

        match record.level {
            LogLevel::Debug => forward!(debug, record, correlation_id, split),
            LogLevel::Info => forward!(info, record, correlation_id, split),
            LogLevel::Warn => forward!(warn, record, correlation_id, split),
            LogLevel::Error => forward!(error, record, correlation_id, split),
        }
    }
}

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records whose message equals `message`.
    pub fn with_message(&self, message: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.message == message)
            .collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

struct LoggerInner {
    config: LoggerConfig,
    correlation_id: Option<String>,
    sink: Arc<dyn LogSink>,
}

/// Structured logger bound to one correlation id.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.inner.config)
            .field("correlation_id", &self.inner.correlation_id)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(config: LoggerConfig, correlation_id: Option<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                config,
                correlation_id,
                sink,
            }),
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.inner.correlation_id.as_deref()
    }

    /// True when both handles point at the same logger.
    pub fn same_as(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn debug(&self, message: &str, fields: Value) {
        self.log(LogLevel::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: Value) {
        self.log(LogLevel::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: Value) {
        self.log(LogLevel::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: Value) {
        self.log(LogLevel::Error, message, fields);
    }

    /// Emits a record. Object `fields` are used as-is, `null` becomes an
    /// empty map and any other value is stored under `value`.
    pub fn log(&self, level: LogLevel, message: &str, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        let config = &self.inner.config;
        self.inner.sink.emit(LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            service: config.service_name.clone(),
            environment: config.environment.clone(),
            api_version: config.api_version.clone(),
            correlation_id: self.inner.correlation_id.clone(),
            fields,
        });
    }
}

/// Builds request-scoped loggers.
pub trait LoggerFactory: Send + Sync {
    fn create(&self, config: &LoggerConfig, correlation_id: Option<&str>) -> Result<Logger, LoggingError>;
}

/// Factory handing out loggers that all write to one sink.
#[derive(Clone)]
pub struct SinkLoggerFactory {
    sink: Arc<dyn LogSink>,
}

impl SinkLoggerFactory {
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self { sink: Arc::new(sink) }
    }

    pub fn tracing() -> Self {
        Self::new(TracingSink)
    }
}

impl LoggerFactory for SinkLoggerFactory {
    fn create(&self, config: &LoggerConfig, correlation_id: Option<&str>) -> Result<Logger, LoggingError> {
        if config.service_name.trim().is_empty() {
            return Err(LoggingError::MissingServiceName);
        }

        Ok(Logger::new(
            config.clone(),
            correlation_id.map(str::to_owned),
            Arc::clone(&self.sink),
        ))
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(cfg: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if cfg.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    installed.map_err(|e| LoggingError::Subscriber(e.to_string()))
}
