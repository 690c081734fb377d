//! Tri-state payload fields

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A payload field as the management API understands it.
///
/// `Absent` means "do not touch" and must be skipped during serialization
/// (`#[serde(default, skip_serializing_if = "Patch::is_absent")]`). `Null`
/// is sent as JSON `null` and clears the remote value.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Patch::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Body {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        name: Patch<String>,
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        description: Patch<String>,
    }

    #[test]
    fn test_absent_is_skipped_and_null_is_sent() {
        let body = Body {
            name: Patch::Value("x".into()),
            description: Patch::Null,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"name": "x", "description": null}));
        assert_eq!(serde_json::to_value(Body::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_deserialize_distinguishes_missing_from_null() {
        let body: Body = serde_json::from_value(json!({"description": null})).unwrap();
        assert_eq!(body.name, Patch::Absent);
        assert_eq!(body.description, Patch::Null);
    }
}
