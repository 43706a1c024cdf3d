//! Error taxonomy for gateway calls.
//!
//! Every failure the client can produce is one variant of [`GatewayError`].
//! Transient failures are retried internally and only surface here once
//! retries are exhausted.

use std::collections::BTreeMap;
use thiserror::Error;

/// Field-level validation errors returned by the gateway (field -> messages).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Why a request stayed transient until retries ran out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransientCause {
    /// The transport failed (timeout, connection reset, DNS).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The gateway kept answering with a retryable status.
    #[error("gateway returned {status}: {message}")]
    Status { status: u16, message: String, body: String },
}

/// Errors surfaced by the resilient client.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Invalid setup, raised at registration or construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No connection profile is registered under the requested name.
    #[error("Unknown connection '{0}'")]
    UnknownConnection(String),

    /// The gateway rejected the credential (401/403).
    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// The targeted instance does not exist on the gateway.
    #[error("Not found: {message}")]
    NotFound { instance: Option<String>, message: String },

    /// The gateway rejected the payload (422).
    #[error("Validation failed: {message}")]
    Validation { message: String, errors: FieldErrors },

    /// A local or remote rate limit refused the call.
    #[error("Rate limit exceeded for '{limit_type}', retry after {retry_after}s")]
    RateLimitExceeded { retry_after: u64, limit_type: String },

    /// Retries exhausted on a transient condition.
    #[error("Request failed after {attempts} attempt(s): {cause}")]
    Transient { attempts: u32, cause: TransientCause },

    /// The caller cancelled while the request was suspended.
    #[error("Request cancelled")]
    Cancelled,

    /// Any other gateway error, with status and raw body preserved.
    #[error("Gateway error ({status}): {message}")]
    Api { status: u16, message: String, body: String },
}

impl GatewayError {
    /// HTTP status associated with the error, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Authentication { status, .. } => Some(*status),
            GatewayError::NotFound { .. } => Some(404),
            GatewayError::Validation { .. } => Some(422),
            GatewayError::Api { status, .. } => Some(*status),
            GatewayError::Transient {
                cause: TransientCause::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }

    /// Seconds the caller should wait before trying again.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            GatewayError::RateLimitExceeded { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether calling again later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimitExceeded { .. } | GatewayError::Transient { .. }
        )
    }

    /// Short stable label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration",
            GatewayError::UnknownConnection(_) => "unknown_connection",
            GatewayError::Authentication { .. } => "authentication",
            GatewayError::NotFound { .. } => "not_found",
            GatewayError::Validation { .. } => "validation",
            GatewayError::RateLimitExceeded { .. } => "rate_limited",
            GatewayError::Transient { .. } => "transient",
            GatewayError::Cancelled => "cancelled",
            GatewayError::Api { .. } => "api",
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
