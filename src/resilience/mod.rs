//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt outcome from the classifier:
//!     → Success: return
//!     → Retryable: retries.rs (attempts left?) → backoff.rs (delay) → sleep → retry
//!     → Terminal / exhausted: typed error
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every transport call has a deadline
//! - Delays are deterministic unless jitter is switched on
//! - Only the final outcome of a retried call is surfaced

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, BackoffPolicy};
pub use retries::{RetryPolicy, RetryState};
