//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for applications that want one
//! - Define the request logging sink the client notifies on every attempt
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and environment (`RUST_LOG` wins)

use std::collections::BTreeMap;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::error::{GatewayError, Result};

/// Kind of notification sent to a [`RequestLogger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    Request,
    Response,
    Error,
}

impl LogEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogEvent::Request => "request",
            LogEvent::Response => "response",
            LogEvent::Error => "error",
        }
    }
}

/// Key-value fields attached to a log event.
pub type LogFields = BTreeMap<&'static str, String>;

/// Receives one notification per attempt phase. Must not block.
pub trait RequestLogger: Send + Sync {
    fn log(&self, event: LogEvent, fields: &LogFields);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn log(&self, event: LogEvent, fields: &LogFields) {
        let field = |name: &'static str| fields.get(name).map(String::as_str).unwrap_or("");
        match event {
            LogEvent::Request => tracing::debug!(
                request_id = field("request_id"),
                method = field("method"),
                url = field("url"),
                attempt = field("attempt"),
                "Gateway request"
            ),
            LogEvent::Response => tracing::debug!(
                request_id = field("request_id"),
                method = field("method"),
                url = field("url"),
                status = field("status"),
                duration_ms = field("duration_ms"),
                "Gateway response"
            ),
            LogEvent::Error => tracing::warn!(
                request_id = field("request_id"),
                method = field("method"),
                url = field("url"),
                error = field("error"),
                duration_ms = field("duration_ms"),
                "Gateway request failed"
            ),
        }
    }
}

/// Install a global subscriber. Fails if one is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("wa_gateway_client={}", config.log_level)))
        .map_err(|e| GatewayError::Configuration(format!("invalid log level: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| GatewayError::Configuration(format!("failed to install logger: {}", e)))
}
