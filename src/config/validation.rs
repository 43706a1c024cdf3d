//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default connection is registered)
//! - Validate value ranges (timeouts > 0, delays ordered, status codes valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the client

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::connection::profile::validate_base_url;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Connections
    let mut seen = HashSet::new();
    for (i, conn) in config.connections.iter().enumerate() {
        if conn.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("connections[{}].name", i), "must not be empty"));
        } else if !seen.insert(conn.name.as_str()) {
            errors.push(ValidationError::new(
                format!("connections[{}].name", i),
                format!("duplicate connection '{}'", conn.name),
            ));
        }
        if let Err(e) = validate_base_url(&conn.base_url) {
            errors.push(ValidationError::new(format!("connections[{}].base_url", i), e));
        }
    }
    if !config.connections.is_empty() && !seen.contains(config.default_connection.as_str()) {
        errors.push(ValidationError::new(
            "default_connection",
            format!("'{}' is not a configured connection", config.default_connection),
        ));
    }

    // HTTP
    if config.http.timeout_seconds == 0 {
        errors.push(ValidationError::new("http.timeout_seconds", "must be greater than 0"));
    }
    if config.http.connect_timeout_seconds == 0 {
        errors.push(ValidationError::new("http.connect_timeout_seconds", "must be greater than 0"));
    }
    if config.http.credential_header.trim().is_empty() {
        errors.push(ValidationError::new("http.credential_header", "must not be empty"));
    }

    // Retry
    let retry = &config.retry;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must be at least 1"));
    }
    if retry.base_delay_ms == 0 {
        errors.push(ValidationError::new("retry.base_delay_ms", "must be greater than 0"));
    }
    if retry.max_delay_ms < retry.base_delay_ms {
        errors.push(ValidationError::new("retry.max_delay_ms", "must not be lower than base_delay_ms"));
    }
    for code in &retry.retryable_status_codes {
        if !(100..=599).contains(code) {
            errors.push(ValidationError::new(
                "retry.retryable_status_codes",
                format!("{} is not an HTTP status code", code),
            ));
        }
    }

    // Rate limiting
    for (class, limit) in &config.rate_limiting.limits {
        if limit.max_attempts == 0 {
            errors.push(ValidationError::new(
                format!("rate_limiting.limits.{}.max_attempts", class),
                "must be greater than 0",
            ));
        }
        if limit.window_seconds == 0 {
            errors.push(ValidationError::new(
                format!("rate_limiting.limits.{}.window_seconds", class),
                "must be greater than 0",
            ));
        }
    }

    // Observability
    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}'", config.observability.log_format),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
