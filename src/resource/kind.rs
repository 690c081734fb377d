//! Resource kinds
//!
//! A [`ResourceKind`] knows how to turn declared fields into a payload, where
//! its instances live, and how to flatten a response. It never talks to the
//! network itself; the lifecycle controller does.

use crate::error::{Result, SyncError};
use crate::mgmt::resource_path;
use crate::state::{ChangeSet, Fields, Tree};
use serde::Serialize;
use serde_json::Value;

pub trait ResourceKind {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Collection path relative to the API base, e.g. `connections`
    fn collection(&self) -> &'static str;

    fn path(&self, id: &str) -> String {
        resource_path(self.collection(), id)
    }

    /// Fields that cannot change in place (discriminants and the like)
    fn immutable_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Declared keys synchronized through relationship calls rather than
    /// the primary payload
    fn relationship_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Remote payload for the eligible fields
    fn payload(&self, fields: &Fields<'_>) -> Result<Value>;

    /// Identity assigned by the service in a create response
    fn identity(&self, created: &Value) -> Result<String> {
        created
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SyncError::MissingField("id".to_string()))
    }

    /// Response -> declared shape
    fn flatten(&self, remote: Value, local: &Tree) -> Result<Tree>;

    /// Add/remove calls needed for set-valued relationships. Only
    /// non-empty change sets produce an entry.
    fn relationships(&self, _fields: &Fields<'_>) -> Result<Vec<RelationshipSync>> {
        Ok(Vec::new())
    }
}

/// Pending add/remove calls for one relationship
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipSync {
    /// Declared key this relationship comes from; also the endpoint name
    /// under the owning resource
    pub field: &'static str,
    pub additions: Option<Value>,
    pub removals: Option<Value>,
}

impl RelationshipSync {
    /// Build the calls for `change`, `encode` producing the request body
    pub fn from_change<T: Ord>(
        field: &'static str,
        change: ChangeSet<T>,
        encode: impl Fn(Vec<T>) -> Value,
    ) -> Option<Self> {
        if change.is_empty() {
            return None;
        }
        let ChangeSet { to_add, to_remove } = change;
        let additions = (!to_add.is_empty()).then(|| encode(to_add.into_iter().collect()));
        let removals = (!to_remove.is_empty()).then(|| encode(to_remove.into_iter().collect()));
        Some(Self {
            field,
            additions,
            removals,
        })
    }

    /// Endpoint taking POST (add) and DELETE (remove), below `parent`
    pub fn path(&self, parent: &str) -> String {
        format!("{}/{}", parent, self.field)
    }
}

/// Serialize a typed payload to JSON
pub fn to_payload<T: Serialize>(payload: &T) -> Result<Value> {
    Ok(serde_json::to_value(payload)?)
}

/// Whether a payload serializes to an empty object (nothing to send)
pub fn is_empty_payload<T: Serialize>(payload: &T) -> Result<bool> {
    Ok(match serde_json::to_value(payload)? {
        Value::Object(map) => map.is_empty(),
        Value::Null => true,
        _ => false,
    })
}

/// Fail when any immutable field changed on an update
pub fn check_immutable(fields: &Fields<'_>, immutable: &[&'static str]) -> Result<()> {
    if fields.is_new() {
        return Ok(());
    }
    match immutable.iter().find(|f| fields.has_change(f)) {
        Some(field) => Err(SyncError::ReplacementRequired {
            field: fields.path(field),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tree_from_json;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[test]
    fn test_relationship_from_empty_change_is_none() {
        let change: ChangeSet<String> = ChangeSet::default();
        assert!(RelationshipSync::from_change("roles", change, |v| json!(v)).is_none());
    }

    #[test]
    fn test_relationship_bodies() {
        let change = ChangeSet::diff(
            &BTreeSet::from(["r1".to_string()]),
            &BTreeSet::from(["r2".to_string()]),
        );
        let sync = RelationshipSync::from_change("roles", change, |v| json!({"roles": v})).unwrap();
        assert_eq!(sync.path("users/u"), "users/u/roles");
        assert_eq!(sync.additions, Some(json!({"roles": ["r2"]})));
        assert_eq!(sync.removals, Some(json!({"roles": ["r1"]})));
    }

    #[test]
    fn test_check_immutable() {
        let prev = tree_from_json(json!({"strategy": "sms"})).unwrap();
        let next = tree_from_json(json!({"strategy": "email"})).unwrap();
        let err = check_immutable(&Fields::new(Some(&prev), &next), &["strategy"]).unwrap_err();
        assert!(matches!(err, SyncError::ReplacementRequired { field } if field == "strategy"));
        assert!(check_immutable(&Fields::new(None, &next), &["strategy"]).is_ok());
    }

    #[test]
    fn test_is_empty_payload() {
        assert!(is_empty_payload(&json!({})).unwrap());
        assert!(!is_empty_payload(&json!({"a": 1})).unwrap());
    }
}
