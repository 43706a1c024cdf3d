//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Typed call (Operation, instance)
//!     → operations.rs (static table: verb, path template, class)
//!     → RequestOptions with rendered path and class
//!
//! Raw call (endpoint path)
//!     → matcher.rs (prefix table → operation class)
//!     → operations.rs (template match → addressed instance, if any)
//! ```
//!
//! # Design Decisions
//! - Operation metadata is data, not code: one table, no scattered conditionals
//! - No regex in hot path (prefix matching only)
//! - Deterministic: first matching prefix wins, table ordered most specific first

pub mod matcher;
pub mod operations;

pub use matcher::classify_endpoint;
pub use operations::{instance_from_endpoint, Operation, OperationSpec};

use serde::{Deserialize, Serialize};

/// Coarse endpoint category used to scope rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationClass {
    Default,
    Messages,
    Media,
    Instances,
    Groups,
    Chats,
}

impl OperationClass {
    pub const ALL: [OperationClass; 6] = [
        OperationClass::Default,
        OperationClass::Messages,
        OperationClass::Media,
        OperationClass::Instances,
        OperationClass::Groups,
        OperationClass::Chats,
    ];

    /// Key used in `rate_limiting.limits`.
    pub const fn as_str(self) -> &'static str {
        match self {
            OperationClass::Default => "default",
            OperationClass::Messages => "messages",
            OperationClass::Media => "media",
            OperationClass::Instances => "instances",
            OperationClass::Groups => "groups",
            OperationClass::Chats => "chats",
        }
    }
}

impl std::fmt::Display for OperationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
