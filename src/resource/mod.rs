//! Resource kinds and their lifecycle
//!
//! # Architecture
//!
//! - [`kind`] - The [`ResourceKind`] trait: payload, flatten, relationships
//! - [`registry`] - Discriminant-keyed variant dispatch for polymorphic kinds
//! - [`lifecycle`] - Create/Read/Update/Delete against the management API
//! - [`connection`], [`log_stream`], [`role`], [`user`] - Concrete kinds
//!
//! # Example
//!
//! ```ignore
//! use idpsync::resource::{get_kind, Lifecycle};
//!
//! async fn sync(client: &ManagementClient, desired: &Tree) -> SyncOutcome {
//!     let kind = get_kind("connection").unwrap();
//!     Lifecycle::new(client, kind)
//!         .create(desired, Deadline::after(Duration::from_secs(300)))
//!         .await
//! }
//! ```

pub mod connection;
pub mod kind;
pub mod lifecycle;
pub mod log_stream;
pub mod registry;
pub mod role;
pub mod user;

pub use connection::ConnectionKind;
pub use kind::{RelationshipSync, ResourceKind};
pub use lifecycle::{plan, Lifecycle, ReadOutcome, SyncOutcome};
pub use log_stream::LogStreamKind;
pub use registry::{Variant, VariantFamily, VariantHandler, VariantRegistry};
pub use role::RoleKind;
pub use user::UserKind;

/// Names accepted by [`get_kind`]
pub const KIND_NAMES: &[&str] = &["connection", "log-stream", "role", "user"];

/// Look up a resource kind by its CLI name
pub fn get_kind(name: &str) -> Option<&'static dyn ResourceKind> {
    match name {
        "connection" => Some(&ConnectionKind),
        "log-stream" => Some(&LogStreamKind),
        "role" => Some(&RoleKind),
        "user" => Some(&UserKind),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_name_resolves() {
        for name in KIND_NAMES {
            assert!(get_kind(name).is_some(), "{name}");
        }
        assert!(get_kind("tenant").is_none());
    }

    #[test]
    fn test_collections() {
        let collections: Vec<_> = KIND_NAMES
            .iter()
            .filter_map(|name| get_kind(name))
            .map(|kind| kind.collection())
            .collect();
        assert_eq!(collections, vec!["connections", "log-streams", "roles", "users"]);
    }
}
