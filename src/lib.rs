//! Resilient client for a WhatsApp gateway HTTP API.
//!
//! Every call goes through the same path: pick a connection, respect the
//! local rate limit, send, classify the answer, retry what is transient and
//! return one typed result.
//!
//! ```no_run
//! use wa_gateway_client::{ClientConfig, Operation, ResilientClient};
//!
//! # async fn run() -> wa_gateway_client::Result<()> {
//! let config = wa_gateway_client::config::loader::load_config("gateway.toml".as_ref())?;
//! let client = ResilientClient::new(config)?;
//! let state = client.call(Operation::ConnectionState, Some("main"), None).await?;
//! println!("{:?}", state.response().map(|r| &r.body));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rate_limit;
pub mod resilience;
pub mod routing;

pub use config::ClientConfig;
pub use connection::{ConnectionProfile, ConnectionRegistry};
pub use error::{GatewayError, Result, TransientCause};
pub use http::{GatewayResponse, HttpMethod, RequestOptions, RequestOutcome, ResilientClient};
pub use lifecycle::Cancellation;
pub use rate_limit::RateLimiter;
pub use routing::{Operation, OperationClass};
