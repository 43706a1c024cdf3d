//! Retry delay calculation.

use std::time::Duration;

use crate::config::{BackoffStrategy, RetryConfig};
use crate::error::{GatewayError, Result};

/// Calculate the delay before retry number `attempt` (1-indexed), capped at `max_ms`.
///
/// Attempt 0 means "no retry yet" and yields no delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, strategy: BackoffStrategy) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let delay_ms = match strategy {
        BackoffStrategy::Fixed => base_ms,
        BackoffStrategy::Linear => base_ms.saturating_mul(attempt as u64),
        BackoffStrategy::Exponential => {
            let exponential_base = 2u64.saturating_pow(attempt - 1);
            base_ms.saturating_mul(exponential_base)
        }
    };

    Duration::from_millis(delay_ms.min(max_ms))
}

/// Validated backoff settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_ms: u64,
    max_ms: u64,
    strategy: BackoffStrategy,
    jitter: bool,
}

impl BackoffPolicy {
    pub fn new(base_ms: u64, max_ms: u64, strategy: BackoffStrategy) -> Result<Self> {
        if base_ms == 0 {
            return Err(GatewayError::Configuration("backoff base delay must be greater than 0".into()));
        }
        if max_ms < base_ms {
            return Err(GatewayError::Configuration(format!(
                "backoff max delay {}ms is lower than base delay {}ms",
                max_ms, base_ms
            )));
        }
        Ok(Self { base_ms, max_ms, strategy, jitter: false })
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self> {
        Ok(Self::new(config.base_delay_ms, config.max_delay_ms, config.backoff_strategy)?
            .with_jitter(config.jitter))
    }

    /// Add 0 to 10% random jitter on top of each delay, still capped at the max delay.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = calculate_backoff(attempt, self.base_ms, self.max_ms, self.strategy);
        if !self.jitter {
            return delay;
        }

        let jitter_range = delay.as_millis() as u64 / 10;
        let jitter = if jitter_range > 0 { fastrand::u64(0..jitter_range) } else { 0 };
        (delay + Duration::from_millis(jitter)).min(self.max_delay())
    }
}
