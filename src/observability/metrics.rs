//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): attempts by connection, method, status
//! - `gateway_request_duration_seconds` (histogram): attempt latency
//! - `gateway_retries_total` (counter): retries by connection, reason
//! - `gateway_rate_limited_total` (counter): local limiter refusals by class, policy
//!
//! # Design Decisions
//! - The client only talks to a [`MetricsSink`]; the default sink forwards to
//!   the `metrics` facade, which is a no-op until a recorder is installed
//! - Names ending in `_total` are counters, everything else a histogram

use std::net::SocketAddr;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{GatewayError, Result};

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "gateway_request_duration_seconds";
pub const RETRIES_TOTAL: &str = "gateway_retries_total";
pub const RATE_LIMITED_TOTAL: &str = "gateway_rate_limited_total";

/// Tags attached to a metric sample.
pub type Tags = Vec<(&'static str, String)>;

/// Receives metric samples. Must not block.
pub trait MetricsSink: Send + Sync {
    fn record(&self, name: &'static str, value: f64, tags: &Tags);
}

/// Forwards samples to the global `metrics` recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsRecorder;

impl MetricsSink for MetricsRecorder {
    fn record(&self, name: &'static str, value: f64, tags: &Tags) {
        if name.ends_with("_total") {
            metrics::counter!(name, tags).increment(value.max(0.0) as u64);
        } else {
            metrics::histogram!(name, tags).record(value);
        }
    }
}

/// Install a Prometheus exporter listening on `addr`. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| GatewayError::Configuration(format!("failed to install metrics exporter: {}", e)))?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}
