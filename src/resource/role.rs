//! Roles and their permission grants

use super::kind::{to_payload, RelationshipSync, ResourceKind};
use crate::error::{Result, SyncError};
use crate::state::{ConfigValue, Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

const PERMISSIONS: &str = "permissions";

/// One API permission granted to a role
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Permission {
    pub resource_server_identifier: String,
    #[serde(rename = "permission_name")]
    pub name: String,
}

impl Permission {
    fn from_declared(path: &str, value: &ConfigValue) -> Result<Self> {
        let map = value.as_map().ok_or_else(|| SyncError::TypeMismatch {
            field: path.to_string(),
            expected: "map",
            found: value.type_name(),
        })?;
        let field = |key: &str| match map.get(key) {
            Some(ConfigValue::String(s)) => Ok(s.clone()),
            Some(other) => Err(SyncError::TypeMismatch {
                field: format!("{path}.{key}"),
                expected: "string",
                found: other.type_name(),
            }),
            None => Err(SyncError::MissingField(format!("{path}.{key}"))),
        };
        Ok(Self {
            resource_server_identifier: field("resource_server_identifier")?,
            name: field("name")?,
        })
    }
}

fn declared_permissions(path: &str, value: &ConfigValue) -> Result<BTreeSet<Permission>> {
    match value {
        ConfigValue::List(items) => items
            .iter()
            .map(|item| Permission::from_declared(path, item))
            .collect(),
        other => Err(SyncError::TypeMismatch {
            field: path.to_string(),
            expected: "list of permissions",
            found: other.type_name(),
        }),
    }
}

#[derive(Debug, Serialize)]
struct RolePayload {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    description: Patch<String>,
}

#[derive(Debug, Deserialize)]
struct RoleResponse {
    #[serde(default)]
    name: Patch<String>,
    #[serde(default)]
    description: Patch<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleKind;

impl ResourceKind for RoleKind {
    fn name(&self) -> &'static str {
        "role"
    }

    fn collection(&self) -> &'static str {
        "roles"
    }

    fn relationship_fields(&self) -> &'static [&'static str] {
        &[PERMISSIONS]
    }

    fn payload(&self, fields: &Fields<'_>) -> Result<Value> {
        to_payload(&RolePayload {
            name: fields.string("name")?,
            description: fields.string("description")?,
        })
    }

    fn flatten(&self, remote: Value, local: &Tree) -> Result<Tree> {
        let response: RoleResponse = serde_json::from_value(remote)?;
        Ok(Flattener::new(local)
            .put("name", &response.name)
            .put("description", &response.description)
            .put_write_only(PERMISSIONS)
            .finish())
    }

    fn relationships(&self, fields: &Fields<'_>) -> Result<Vec<RelationshipSync>> {
        let change = fields.set_change(PERMISSIONS, declared_permissions)?;
        Ok(
            RelationshipSync::from_change(PERMISSIONS, change, |permissions| {
                json!({ "permissions": permissions })
            })
            .into_iter()
            .collect(),
        )
    }
}
