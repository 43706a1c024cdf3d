//! Client-side rate limiting subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing request:
//!     → limiter.rs attempt(scope, class)   (atomic check-and-increment)
//!     → window.rs (lazy reset, fixed window)
//!     → refused: client applies on_limit_reached (wait | throw | skip)
//! ```
//!
//! # Design Decisions
//! - Fixed windows, not sliding: predictable and cheap
//! - Lazy reset on access, no background timer
//! - One lock per (scope, class) window, never a global lock
//! - Clock is injectable so window expiry can be tested without sleeping

pub mod clock;
pub mod limiter;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::RateLimiter;
pub use window::RateLimitWindow;
