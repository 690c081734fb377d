//! Declared configuration values

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declared configuration tree. Keys iterate in sorted order, so anything
/// derived from a tree is independent of insertion order.
pub type Tree = BTreeMap<String, ConfigValue>;

/// A single declared value. Unset fields are absent from their parent map;
/// there is no null variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Set(BTreeSet<String>),
    Map(Tree),
}

impl ConfigValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Set(_) => "set",
            ConfigValue::Map(_) => "map",
        }
    }

    /// Convert from JSON, dropping nulls (they denote "unset")
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        Some(match value {
            Value::Null => return None,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Int(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => {
                ConfigValue::List(items.into_iter().filter_map(Self::from_json).collect())
            }
            Value::Object(map) => ConfigValue::Map(
                map.into_iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                    .collect(),
            ),
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Int(i) => Value::from(*i),
            ConfigValue::Float(f) => Value::from(*f),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            ConfigValue::Set(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            ConfigValue::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn as_map(&self) -> Option<&Tree> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(value)
            .ok_or_else(|| serde::de::Error::custom("null is not a declared value"))
    }
}

/// Convert a JSON object into a tree; `None` if the value is not an object
pub fn tree_from_json(value: serde_json::Value) -> Option<Tree> {
    match ConfigValue::from_json(value)? {
        ConfigValue::Map(tree) => Some(tree),
        _ => None,
    }
}

/// Convert a tree into a JSON object
pub fn tree_to_json(tree: &Tree) -> serde_json::Value {
    serde_json::Value::Object(tree.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<Tree> for ConfigValue {
    fn from(value: Tree) -> Self {
        ConfigValue::Map(value)
    }
}

impl From<BTreeSet<String>> for ConfigValue {
    fn from(value: BTreeSet<String>) -> Self {
        ConfigValue::Set(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::List(value.into_iter().map(ConfigValue::String).collect())
    }
}

impl From<BTreeMap<String, String>> for ConfigValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        ConfigValue::Map(
            value
                .into_iter()
                .map(|(k, v)| (k, ConfigValue::String(v)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_drops_nulls() {
        let tree = tree_from_json(json!({"name": "x", "description": null, "options": {"a": null}}))
            .unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree["options"], ConfigValue::Map(Tree::new()));
    }

    #[test]
    fn test_numbers_keep_integer_type() {
        let tree = tree_from_json(json!({"port": 8088, "ratio": 0.5})).unwrap();
        assert_eq!(tree["port"], ConfigValue::Int(8088));
        assert_eq!(tree["ratio"], ConfigValue::Float(0.5));
    }

    #[test]
    fn test_json_round_trip_is_key_ordered() {
        let value = json!({"b": [1, 2], "a": {"z": true, "y": "s"}});
        let tree = tree_from_json(value.clone()).unwrap();
        assert_eq!(tree_to_json(&tree), value);
        let keys: Vec<_> = tree.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_non_object_is_not_a_tree() {
        assert!(tree_from_json(json!([1, 2])).is_none());
        assert!(tree_from_json(json!(null)).is_none());
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let tree: Tree = serde_yaml::from_str("name: x\nscopes: [email, profile]\n").unwrap();
        assert_eq!(tree["name"], ConfigValue::from("x"));
        assert_eq!(tree["scopes"].type_name(), "list");
    }
}
