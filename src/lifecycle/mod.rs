//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Caller creates Cancellation
//!     → passes it in RequestOptions
//!     → rate-limit wait, transport call and retry sleep race against it
//!     → cancel() wakes every suspended call with GatewayError::Cancelled
//! ```
//!
//! # Design Decisions
//! - A cancelled transport call is dropped; the gateway may still have
//!   received it
//! - Cancelled is a distinct error, never folded into a transport failure

pub mod cancellation;

pub use cancellation::Cancellation;
