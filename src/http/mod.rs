//! HTTP subsystem: everything between a call and the gateway.
//!
//! # Data Flow
//! ```text
//! RequestOptions / Operation
//!     → client.rs (connection, rate limit, retry loop)
//!     → transport.rs (one HTTP attempt, reqwest by default)
//!     → classifier.rs (status + body → success / retryable / terminal)
//!     → response.rs (GatewayResponse or Skipped)
//! ```
//!
//! # Design Decisions
//! - The transport is a trait so tests and embedders can swap it
//! - Classification is pure and knows nothing about retry counts
//! - The per-request timeout travels with each attempt, so a reload applies
//!   without rebuilding the HTTP client

pub mod classifier;
pub mod client;
pub mod request;
pub mod response;
pub mod transport;

pub use classifier::{ClassifiedOutcome, Classifier, ClassifyContext};
pub use client::{ClientBuilder, ResilientClient};
pub use request::{HttpMethod, RequestOptions, X_REQUEST_ID};
pub use response::{GatewayResponse, RequestOutcome};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse};
