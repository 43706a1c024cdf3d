//! Call results handed back to the caller.
//!
//! # Design Decisions
//! - A call skipped by the local rate limiter is its own variant, never an
//!   empty success, so callers cannot mistake it for a gateway answer
//! - The raw body is kept next to the parsed JSON for diagnostics

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{GatewayError, Result};

/// A successful (2xx) gateway answer.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    /// Parsed body: JSON when possible, the text as a string otherwise,
    /// `Null` when empty.
    pub body: Value,
    pub raw: String,
    /// Connection the call went through.
    pub connection: String,
    pub url: String,
    /// Attempts it took, including the successful one.
    pub attempts: u32,
    pub request_id: Uuid,
}

impl GatewayResponse {
    pub fn new(status: u16, raw: String, connection: String, url: String, attempts: u32, request_id: Uuid) -> Self {
        let body = if raw.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&raw).unwrap_or_else(|_| Value::String(raw.clone()))
        };
        Self { status, body, raw, connection, url, attempts, request_id }
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| GatewayError::Api {
            status: self.status,
            message: format!("unexpected response body: {}", e),
            body: self.raw.clone(),
        })
    }
}

/// What a call produced when it did not fail.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    /// The gateway answered with success.
    Response(GatewayResponse),
    /// The local rate limiter refused the call under the `skip` policy; nothing
    /// was sent.
    Skipped {
        connection: String,
        operation_class: String,
        /// Seconds until the window frees a slot.
        retry_after: u64,
    },
}

impl RequestOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RequestOutcome::Skipped { .. })
    }

    pub fn response(&self) -> Option<&GatewayResponse> {
        match self {
            RequestOutcome::Response(response) => Some(response),
            RequestOutcome::Skipped { .. } => None,
        }
    }

    pub fn into_response(self) -> Option<GatewayResponse> {
        match self {
            RequestOutcome::Response(response) => Some(response),
            RequestOutcome::Skipped { .. } => None,
        }
    }
}
