//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → handed to ResilientClient::builder()
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → ResilientClient::apply_config (atomic swap)
//!     → calls started afterwards observe new settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::BackoffStrategy;
pub use schema::ClientConfig;
pub use schema::ConnectionConfig;
pub use schema::HttpConfig;
pub use schema::LimitConfig;
pub use schema::ObservabilityConfig;
pub use schema::OnLimitReached;
pub use schema::RateLimitConfig;
pub use schema::RetryConfig;
