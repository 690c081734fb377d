//! Declarative synchronization of identity-platform management API resources
//!
//! - [`state`] - Declared trees, conditional field access, set reconciliation
//! - [`resource`] - Resource kinds, variant dispatch and the lifecycle controller
//! - [`mgmt`] - Rate-limited, authenticated management API client
//! - [`config`] - Persistent and environment configuration

pub mod config;
pub mod error;
pub mod mgmt;
pub mod resource;
pub mod state;

pub use error::{Result, SyncError};

/// Version injected at compile time via IDPSYNC_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("IDPSYNC_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
