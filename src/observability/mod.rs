//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every attempt the client makes produces:
//!     → logging.rs (RequestLogger: request / response / error events)
//!     → metrics.rs (MetricsSink: counters and latency histograms)
//!
//! Consumers:
//!     → tracing subscriber (stdout, pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Sinks are optional; a client with neither works the same
//! - A failing or panicking sink is swallowed and never changes a call's result
//! - Request ID flows through log fields and the `x-request-id` header

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogEvent, LogFields, RequestLogger, TracingLogger};
pub use metrics::{init_metrics, MetricsRecorder, MetricsSink, Tags};
