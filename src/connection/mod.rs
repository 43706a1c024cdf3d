//! Connection subsystem.
//!
//! # Data Flow
//! ```text
//! register(name, base_url, credential)
//!     → profile.rs (validate URL, build immutable profile)
//!     → registry.rs (insert or overwrite by name)
//!
//! Request:
//!     → registry.resolve(override?)
//!     → explicit name wins, else active pointer
//!     → Arc<ConnectionProfile> handed to the client for this call
//! ```
//!
//! # Design Decisions
//! - Profiles are immutable; re-registering a name replaces the whole profile
//! - The active pointer is shared client state, not request-scoped. Callers
//!   needing isolation pass an explicit connection per request
//! - Registration is rare, lookups are hot: read-write lock on the map,
//!   atomic swap for the active name

pub mod profile;
pub mod registry;

pub use profile::ConnectionProfile;
pub use registry::ConnectionRegistry;
