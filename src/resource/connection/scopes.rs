//! Scope handling for connection options
//!
//! Most social and enterprise strategies expose each OAuth scope as a
//! boolean flag on the options object; a few take a space-separated
//! `scope` string instead.

use crate::error::{Result, SyncError};
use crate::state::{Fields, Patch};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declared key holding the scope set
pub const SCOPES_FIELD: &str = "scopes";

/// Per-scope boolean flags, flattened into the options object.
///
/// Only flags touched by the change set are sent: removed scopes as
/// `false`, added scopes as `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScopeFlags(BTreeMap<String, bool>);

impl ScopeFlags {
    pub fn expand(fields: &Fields<'_>, known: &[&str]) -> Result<Self> {
        let change = fields.string_set_change(SCOPES_FIELD)?;

        let mut flags = BTreeMap::new();
        for scope in &change.to_remove {
            flags.insert(checked(fields, known, scope)?, false);
        }
        for scope in &change.to_add {
            flags.insert(checked(fields, known, scope)?, true);
        }
        Ok(Self(flags))
    }

    /// Known scopes whose flag is set
    pub fn enabled(&self, known: &[&str]) -> BTreeSet<String> {
        self.0
            .iter()
            .filter(|(scope, enabled)| **enabled && known.contains(&scope.as_str()))
            .map(|(scope, _)| scope.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ScopeFlags {
    /// Collects every boolean left over after the named option fields
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(k, v)| v.as_bool().map(|b| (k, b)))
                .collect(),
        ))
    }
}

fn checked(fields: &Fields<'_>, known: &[&str], scope: &str) -> Result<String> {
    if known.contains(&scope) {
        Ok(scope.to_string())
    } else {
        Err(SyncError::InvalidValue {
            field: fields.path(SCOPES_FIELD),
            reason: format!("unknown scope {scope:?}"),
        })
    }
}

/// Space-separated `scope` string, sent whole whenever the declared set changed
pub fn expand_scope_string(fields: &Fields<'_>) -> Result<Patch<String>> {
    Ok(fields
        .string_set(SCOPES_FIELD)?
        .map(|scopes| scopes.into_iter().collect::<Vec<_>>().join(" ")))
}

/// Parse a `scope` string back into a set
pub fn parse_scope_string(scope: &Patch<String>) -> BTreeSet<String> {
    scope
        .value()
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
