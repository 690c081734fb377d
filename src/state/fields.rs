//! Conditional field accessor
//!
//! Reads fields from the desired tree only when they differ from the
//! previously declared tree. Creation (no previous tree) makes every
//! declared field eligible.

use super::condition::Condition;
use super::patch::Patch;
use super::reconcile::ChangeSet;
use super::value::{ConfigValue, Tree};
use crate::error::{Result, SyncError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

static EMPTY_TREE: Tree = BTreeMap::new();

/// Accessor over a `(previous, desired)` pair, optionally scoped to a
/// nested block.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    previous: Option<&'a Tree>,
    desired: &'a Tree,
    prefix: String,
}

impl<'a> Fields<'a> {
    /// `previous = None` denotes a first-time creation
    pub fn new(previous: Option<&'a Tree>, desired: &'a Tree) -> Self {
        Self {
            previous,
            desired,
            prefix: String::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.previous.is_none()
    }

    pub fn desired(&self) -> &'a Tree {
        self.desired
    }

    pub fn previous(&self) -> Option<&'a Tree> {
        self.previous
    }

    /// Desired value at `key`, regardless of change
    pub fn get(&self, key: &str) -> Option<&'a ConfigValue> {
        self.desired.get(key)
    }

    /// Full dotted path of `key`, for error messages
    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    /// Eligibility of `key`: declared on create, or different from before on update
    pub fn has_change(&self, key: &str) -> bool {
        match self.previous {
            None => self.desired.contains_key(key),
            Some(previous) => match (previous.get(key), self.desired.get(key)) {
                (Some(before), Some(after)) => !same_value(before, after),
                (before, after) => before.is_some() != after.is_some(),
            },
        }
    }

    /// Like [`has_change`](Self::has_change), but member order is ignored
    fn has_set_change(&self, key: &str) -> bool {
        let Some(previous) = self.previous else {
            return self.desired.contains_key(key);
        };
        match (previous.get(key), self.desired.get(key)) {
            (Some(before), Some(after)) => match (as_string_set(before), as_string_set(after)) {
                (Some(before), Some(after)) => before != after,
                _ => before != after,
            },
            (before, after) => before.is_some() != after.is_some(),
        }
    }

    /// Keys eligible for writing, in sorted order
    pub fn changed_keys(&self) -> BTreeSet<String> {
        let mut keys: BTreeSet<String> = self.desired.keys().cloned().collect();
        if let Some(previous) = self.previous {
            keys.extend(previous.keys().cloned());
        }
        keys.retain(|k| self.has_change(k));
        keys
    }

    /// Scope the accessor to the nested mapping at `key`
    pub fn block(&self, key: &str) -> Result<Fields<'a>> {
        let desired = match self.desired.get(key) {
            None => &EMPTY_TREE,
            Some(ConfigValue::Map(map)) => map,
            Some(other) => return Err(self.mismatch(key, "map", other)),
        };
        let previous = match self.previous {
            None => None,
            Some(previous) => match previous.get(key) {
                Some(ConfigValue::Map(map)) => Some(map),
                _ => Some(&EMPTY_TREE),
            },
        };

        Ok(Fields {
            previous,
            desired,
            prefix: self.path(key),
        })
    }

    pub fn string(&self, key: &str) -> Result<Patch<String>> {
        self.read(key, self.has_change(key), "string", as_string)
    }

    pub fn bool(&self, key: &str) -> Result<Patch<bool>> {
        self.read(key, self.has_change(key), "bool", as_bool)
    }

    pub fn int(&self, key: &str) -> Result<Patch<i64>> {
        self.read(key, self.has_change(key), "int", as_int)
    }

    pub fn float(&self, key: &str) -> Result<Patch<f64>> {
        self.read(key, self.has_change(key), "float", as_float)
    }

    pub fn string_list(&self, key: &str) -> Result<Patch<Vec<String>>> {
        self.read(key, self.has_change(key), "list of strings", as_string_list)
    }

    pub fn string_set(&self, key: &str) -> Result<Patch<BTreeSet<String>>> {
        self.read(key, self.has_set_change(key), "set of strings", as_string_set)
    }

    pub fn string_map(&self, key: &str) -> Result<Patch<BTreeMap<String, String>>> {
        self.read(key, self.has_change(key), "map of strings", as_string_map)
    }

    pub fn map_list(&self, key: &str) -> Result<Patch<Vec<Tree>>> {
        self.read(key, self.has_change(key), "list of maps", as_map_list)
    }

    /// Arbitrary nested mapping sent as a whole (metadata-style fields)
    pub fn map(&self, key: &str) -> Result<Patch<Tree>> {
        self.read(key, self.has_change(key), "map", |v| v.as_map().cloned())
    }

    /// Nested block expanded field-by-field through `build`.
    ///
    /// Unchanged blocks are absent; removed blocks are null; otherwise
    /// `build` sees an accessor scoped to the block, so only the changed
    /// sub-fields end up in the payload. An update that leaves nothing to
    /// send (only set members reordered) is absent too.
    pub fn nested<T: Serialize>(
        &self,
        key: &str,
        build: impl FnOnce(&Fields<'a>) -> Result<T>,
    ) -> Result<Patch<T>> {
        let block = self.block(key)?;
        if !self.has_change(key) {
            return Ok(Patch::Absent);
        }
        if !self.desired.contains_key(key) {
            return Ok(if self.is_new() { Patch::Absent } else { Patch::Null });
        }
        let built = build(&block)?;
        if !self.is_new() {
            if let serde_json::Value::Object(map) = serde_json::to_value(&built)? {
                if map.is_empty() {
                    return Ok(Patch::Absent);
                }
            }
        }
        Ok(Patch::Value(built))
    }

    /// Read `key` when `condition` holds, whether or not `key` itself changed
    pub fn string_when(&self, key: &str, condition: &Condition) -> Result<Patch<String>> {
        self.read(key, condition.evaluate(self), "string", as_string)
    }

    pub fn bool_when(&self, key: &str, condition: &Condition) -> Result<Patch<bool>> {
        self.read(key, condition.evaluate(self), "bool", as_bool)
    }

    /// Desired string value, ignoring change tracking
    pub fn desired_string(&self, key: &str) -> Result<Option<String>> {
        match self.desired.get(key) {
            None => Ok(None),
            Some(value) => as_string(value)
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "string", value)),
        }
    }

    pub fn required_string(&self, key: &str) -> Result<String> {
        self.desired_string(key)?
            .ok_or_else(|| SyncError::MissingField(self.path(key)))
    }

    /// Change set between the previously and newly declared string sets
    pub fn string_set_change(&self, key: &str) -> Result<ChangeSet<String>> {
        self.set_change(key, |path, value| {
            as_string_set(value).ok_or_else(|| SyncError::TypeMismatch {
                field: path.to_string(),
                expected: "set of strings",
                found: value.type_name(),
            })
        })
    }

    /// Change set for a set-valued field whose elements `extract` decodes.
    ///
    /// Only the two declared snapshots are consulted.
    pub fn set_change<T, F>(&self, key: &str, extract: F) -> Result<ChangeSet<T>>
    where
        T: Ord + Clone,
        F: Fn(&str, &ConfigValue) -> Result<BTreeSet<T>>,
    {
        let path = self.path(key);
        let next = match self.desired.get(key) {
            Some(value) => extract(&path, value)?,
            None => BTreeSet::new(),
        };
        let previous = match self.previous.and_then(|p| p.get(key)) {
            Some(value) => extract(&path, value)?,
            None => BTreeSet::new(),
        };
        Ok(ChangeSet::diff(&previous, &next))
    }

    fn read<T>(
        &self,
        key: &str,
        eligible: bool,
        expected: &'static str,
        extract: fn(&ConfigValue) -> Option<T>,
    ) -> Result<Patch<T>> {
        let declared = match self.desired.get(key) {
            Some(value) => Some(extract(value).ok_or_else(|| self.mismatch(key, expected, value))?),
            None => None,
        };

        if !eligible {
            return Ok(Patch::Absent);
        }

        Ok(match declared {
            Some(value) => Patch::Value(value),
            None => {
                let was_set = self.previous.is_some_and(|p| p.contains_key(key));
                if was_set {
                    Patch::Null
                } else {
                    Patch::Absent
                }
            }
        })
    }

    fn mismatch(&self, key: &str, expected: &'static str, found: &ConfigValue) -> SyncError {
        SyncError::TypeMismatch {
            field: self.path(key),
            expected,
            found: found.type_name(),
        }
    }
}

pub fn as_string(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::String(s) => Some(s.clone()),
        _ => None,
    }
}

pub fn as_bool(value: &ConfigValue) -> Option<bool> {
    match value {
        ConfigValue::Bool(b) => Some(*b),
        _ => None,
    }
}

pub fn as_int(value: &ConfigValue) -> Option<i64> {
    match value {
        ConfigValue::Int(i) => Some(*i),
        _ => None,
    }
}

pub fn as_float(value: &ConfigValue) -> Option<f64> {
    match value {
        ConfigValue::Float(f) => Some(*f),
        _ => None,
    }
}

pub fn as_string_list(value: &ConfigValue) -> Option<Vec<String>> {
    match value {
        ConfigValue::List(items) => items.iter().map(as_string).collect(),
        _ => None,
    }
}

/// Structural equality, except that a set matches any list or set with the
/// same members
fn same_value(a: &ConfigValue, b: &ConfigValue) -> bool {
    match (a, b) {
        (ConfigValue::Set(_), _) | (_, ConfigValue::Set(_)) => {
            match (as_string_set(a), as_string_set(b)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        (ConfigValue::Map(a), ConfigValue::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| same_value(value, other)))
        }
        _ => a == b,
    }
}

/// Sets arrive as lists from JSON/YAML hosts; both shapes are accepted
pub fn as_string_set(value: &ConfigValue) -> Option<BTreeSet<String>> {
    match value {
        ConfigValue::Set(items) => Some(items.clone()),
        ConfigValue::List(items) => items.iter().map(as_string).collect(),
        _ => None,
    }
}

pub fn as_string_map(value: &ConfigValue) -> Option<BTreeMap<String, String>> {
    match value {
        ConfigValue::Map(map) => map
            .iter()
            .map(|(k, v)| as_string(v).map(|v| (k.clone(), v)))
            .collect(),
        _ => None,
    }
}

pub fn as_map_list(value: &ConfigValue) -> Option<Vec<Tree>> {
    match value {
        ConfigValue::List(items) => items.iter().map(|v| v.as_map().cloned()).collect(),
        _ => None,
    }
}
