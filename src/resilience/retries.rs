//! Retry logic.
//!
//! # Responsibilities
//! - Track attempts and the last transient failure for one outbound call
//! - Pick the delay before the next attempt
//!
//! # Design Decisions
//! - Retries disabled means exactly one attempt
//! - A gateway `retry_after` hint wins over the computed backoff
//! - Which statuses are transient is decided by the classifier alone
//! - Transport errors (timeouts, resets) are always retryable

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{GatewayError, Result, TransientCause};
use crate::resilience::backoff::BackoffPolicy;

/// Validated retry settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Result<Self> {
        let backoff = BackoffPolicy::from_config(config)?;
        let max_attempts = if config.enabled { config.max_attempts.max(1) } else { 1 };

        Ok(Self { max_attempts, backoff })
    }

    /// Total attempts allowed, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Delay before retry `attempt` (1-indexed); a server hint takes precedence.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        match retry_after {
            Some(secs) => Duration::from_secs(secs),
            None => self.backoff.delay(attempt),
        }
    }

    /// Fresh per-call state.
    pub fn start(&self) -> RetryState {
        RetryState {
            attempt: 0,
            max_attempts: self.max_attempts,
            last_error: None,
        }
    }
}

/// Progress of one outbound call. Dropped when the call ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    last_error: Option<TransientCause>,
}

impl RetryState {
    /// Register a new attempt, returning its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Remember the failure of the current attempt.
    pub fn record_failure(&mut self, cause: TransientCause) {
        self.last_error = Some(cause);
    }

    pub fn last_error(&self) -> Option<&TransientCause> {
        self.last_error.as_ref()
    }

    /// Error surfaced once attempts run out, wrapping the last failure.
    pub fn into_error(self) -> GatewayError {
        GatewayError::Transient {
            attempts: self.attempt,
            cause: self
                .last_error
                .unwrap_or_else(|| TransientCause::Transport("no attempt was made".to_string())),
        }
    }
}
