//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the gateway client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection used when a request names none.
    pub default_connection: String,

    /// Connection profiles registered at construction time.
    pub connections: Vec<ConnectionConfig>,

    /// Transport settings.
    pub http: HttpConfig,

    /// Retry configuration.
    pub retry: RetryConfig,

    /// Client-side rate limiting configuration.
    pub rate_limiting: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_connection: "default".to_string(),
            connections: Vec::new(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            rate_limiting: RateLimitConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// A named gateway deployment.
#[derive(Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Unique connection identifier.
    pub name: String,

    /// Gateway base URL (e.g., "https://gateway.example.com").
    pub base_url: String,

    /// API key sent in the credential header.
    pub credential: String,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total request timeout in seconds.
    pub timeout_seconds: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_seconds: u64,

    /// Verify the gateway's TLS certificate.
    pub verify_tls: bool,

    /// Header carrying the connection credential.
    pub credential_header: String,

    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            verify_tls: true,
            credential_header: "apikey".to_string(),
            user_agent: concat!("wa-gateway-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Delay growth between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    Fixed,
    Linear,
    #[default]
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Delay growth strategy.
    pub backoff_strategy: BackoffStrategy,

    /// Base delay in milliseconds.
    pub base_delay_ms: u64,

    /// Delay ceiling in milliseconds.
    pub max_delay_ms: u64,

    /// Status codes treated as transient.
    pub retryable_status_codes: Vec<u16>,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            backoff_strategy: BackoffStrategy::Exponential,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            retryable_status_codes: vec![408, 429, 500, 502, 503, 504],
            jitter: false,
        }
    }
}

/// What the client does when a local rate limit refuses a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnLimitReached {
    /// Suspend until a slot frees, then proceed.
    #[default]
    Wait,
    /// Fail immediately with a rate-limit error.
    Throw,
    /// Return a skipped outcome without calling the gateway.
    Skip,
}

/// Limit for one operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LimitConfig {
    /// Calls allowed per window.
    pub max_attempts: u32,

    /// Window length in seconds.
    pub window_seconds: u64,
}

impl LimitConfig {
    pub const fn new(max_attempts: u32, window_seconds: u64) -> Self {
        Self { max_attempts, window_seconds }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable client-side rate limiting.
    pub enabled: bool,

    /// Limits keyed by operation class ("default", "messages", ...).
    pub limits: BTreeMap<String, LimitConfig>,

    /// Policy applied when a limit is hit.
    pub on_limit_reached: OnLimitReached,

    /// Upper bound for the `wait` policy in seconds (0 = unbounded).
    pub max_wait_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let limits = [
            ("default", LimitConfig::new(60, 60)),
            ("messages", LimitConfig::new(30, 60)),
            ("media", LimitConfig::new(10, 60)),
            ("instances", LimitConfig::new(20, 60)),
            ("groups", LimitConfig::new(20, 60)),
            ("chats", LimitConfig::new(60, 60)),
        ]
        .into_iter()
        .map(|(class, limit)| (class.to_string(), limit))
        .collect();

        Self {
            enabled: true,
            limits,
            on_limit_reached: OnLimitReached::Wait,
            max_wait_seconds: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Install a Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [[connections]]
            name = "default"
            base_url = "https://gateway.test"
            credential = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_connection, "default");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.retryable_status_codes, vec![408, 429, 500, 502, 503, 504]);
        assert_eq!(config.rate_limiting.on_limit_reached, OnLimitReached::Wait);
        assert_eq!(config.http.credential_header, "apikey");
    }

    #[test]
    fn test_enums_are_lowercase() {
        let config: ClientConfig = toml::from_str(
            r#"
            [retry]
            backoff_strategy = "linear"

            [rate_limiting]
            on_limit_reached = "skip"

            [rate_limiting.limits.messages]
            max_attempts = 5
            window_seconds = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.backoff_strategy, BackoffStrategy::Linear);
        assert_eq!(config.rate_limiting.on_limit_reached, OnLimitReached::Skip);
        assert_eq!(config.rate_limiting.limits["messages"], LimitConfig::new(5, 10));
        assert!(!config.rate_limiting.limits.contains_key("default"));
    }

    #[test]
    fn test_credential_is_redacted() {
        let conn = ConnectionConfig {
            name: "a".into(),
            base_url: "https://a.test".into(),
            credential: "super-secret".into(),
        };
        assert!(!format!("{:?}", conn).contains("super-secret"));
    }
}
