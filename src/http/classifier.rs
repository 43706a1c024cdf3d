//! Outcome classification.
//!
//! # Responsibilities
//! - Map one HTTP answer onto Success / Retryable / Terminal
//! - Extract a human-readable message from the gateway's error bodies
//! - Extract field errors and retry hints
//!
//! # Design Decisions
//! - Pure: same status and body always give the same outcome
//! - Rules are evaluated in a fixed order; the first match wins
//! - The gateway uses several error shapes, so message lookup is an ordered
//!   fallback chain: `response.message`, `message`, `error`

use std::collections::HashSet;
use serde_json::Value;

use crate::error::{FieldErrors, GatewayError};

/// Message used when no known field carries one.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Why an outcome may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// 429 from the gateway.
    RateLimited,
    /// A configured transient status.
    Transient,
}

/// Terminal error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    NotFound,
    Validation,
    GenericApi,
}

/// Classification of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedOutcome {
    Success {
        status: u16,
        body: String,
    },
    RetryableFailure {
        reason: RetryReason,
        status: u16,
        retry_after: Option<u64>,
        message: String,
        body: String,
    },
    TerminalFailure {
        kind: ErrorKind,
        status: u16,
        message: String,
        body: String,
    },
}

impl ClassifiedOutcome {
    pub fn status(&self) -> u16 {
        match self {
            ClassifiedOutcome::Success { status, .. }
            | ClassifiedOutcome::RetryableFailure { status, .. }
            | ClassifiedOutcome::TerminalFailure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ClassifiedOutcome::Success { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ClassifiedOutcome::RetryableFailure { .. })
    }

    /// Typed error for a terminal outcome; `None` for anything else.
    pub fn terminal_error(&self, instance: Option<&str>) -> Option<GatewayError> {
        let ClassifiedOutcome::TerminalFailure { kind, status, message, body } = self else {
            return None;
        };
        let error = match kind {
            ErrorKind::Authentication => GatewayError::Authentication {
                status: *status,
                message: message.clone(),
            },
            ErrorKind::NotFound => GatewayError::NotFound {
                instance: instance.map(str::to_string),
                message: message.clone(),
            },
            ErrorKind::Validation => GatewayError::Validation {
                message: message.clone(),
                errors: extract_field_errors(&parse_body(body)),
            },
            ErrorKind::GenericApi => GatewayError::Api {
                status: *status,
                message: message.clone(),
                body: body.clone(),
            },
        };
        Some(error)
    }
}

/// Request-side facts the status code alone does not carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext<'a> {
    /// Instance the request addressed, if any.
    pub instance: Option<&'a str>,
    /// Raw `Retry-After` header value.
    pub retry_after_header: Option<&'a str>,
}

/// Maps HTTP answers onto outcomes.
#[derive(Debug, Clone)]
pub struct Classifier {
    retryable: HashSet<u16>,
}

impl Classifier {
    pub fn new(retryable_status_codes: impl IntoIterator<Item = u16>) -> Self {
        Self { retryable: retryable_status_codes.into_iter().collect() }
    }

    /// Classify without request context.
    pub fn classify(&self, status: u16, body: &str) -> ClassifiedOutcome {
        self.classify_with(status, body, &ClassifyContext::default())
    }

    pub fn classify_with(&self, status: u16, body: &str, ctx: &ClassifyContext<'_>) -> ClassifiedOutcome {
        if (200..300).contains(&status) {
            return ClassifiedOutcome::Success { status, body: body.to_string() };
        }

        let json = parse_body(body);
        let message = extract_message(&json);
        let terminal = |kind: ErrorKind| ClassifiedOutcome::TerminalFailure {
            kind,
            status,
            message: message.clone(),
            body: body.to_string(),
        };

        match status {
            401 | 403 => terminal(ErrorKind::Authentication),
            404 if ctx.instance.is_some() => terminal(ErrorKind::NotFound),
            422 => terminal(ErrorKind::Validation),
            429 => ClassifiedOutcome::RetryableFailure {
                reason: RetryReason::RateLimited,
                status,
                retry_after: ctx
                    .retry_after_header
                    .and_then(parse_retry_after_header)
                    .or_else(|| extract_retry_after(&json)),
                message: message.clone(),
                body: body.to_string(),
            },
            s if self.retryable.contains(&s) => ClassifiedOutcome::RetryableFailure {
                reason: RetryReason::Transient,
                status,
                retry_after: None,
                message: message.clone(),
                body: body.to_string(),
            },
            _ => terminal(ErrorKind::GenericApi),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new([408, 429, 500, 502, 503, 504])
    }
}

/// Body as JSON; `Null` when it is not JSON.
pub fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

/// `response.message`, then `message`, then `error`, else [`UNKNOWN_ERROR`].
pub fn extract_message(json: &Value) -> String {
    json.pointer("/response/message")
        .and_then(message_text)
        .or_else(|| json.get("message").and_then(message_text))
        .or_else(|| json.get("error").and_then(message_text))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Field errors from `errors` (object or list), else from the message arrays.
pub fn extract_field_errors(json: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match json.get("errors") {
        Some(Value::Object(fields)) => {
            for (field, value) in fields {
                let messages = match value {
                    Value::Array(items) => items.iter().filter_map(message_text).collect(),
                    other => message_text(other).into_iter().collect(),
                };
                errors.insert(field.clone(), messages);
            }
        }
        Some(Value::Array(items)) => {
            let messages: Vec<String> = items.iter().filter_map(message_text).collect();
            if !messages.is_empty() {
                errors.insert("general".to_string(), messages);
            }
        }
        _ => {}
    }

    if errors.is_empty() {
        let listed = json
            .pointer("/response/message")
            .or_else(|| json.get("message"))
            .and_then(Value::as_array);
        if let Some(items) = listed {
            let messages: Vec<String> = items.iter().filter_map(message_text).collect();
            if !messages.is_empty() {
                errors.insert("general".to_string(), messages);
            }
        }
    }

    errors
}

fn as_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.ceil() as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `retry_after` / `retryAfter`, top level or under `response`.
pub fn extract_retry_after(json: &Value) -> Option<u64> {
    ["/retry_after", "/retryAfter", "/response/retry_after", "/response/retryAfter"]
        .iter()
        .find_map(|pointer| json.pointer(pointer).and_then(as_seconds))
}

/// Delta-seconds form of `Retry-After`; HTTP dates are ignored.
pub fn parse_retry_after_header(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}
