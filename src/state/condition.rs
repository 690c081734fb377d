//! Eligibility predicates over a `(previous, desired)` pair

use super::fields::Fields;

/// When a field may be written, if not simply "when it changed".
///
/// Used for companion parameters the API requires alongside other fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    IsNew,
    Changed(String),
    AnyChanged(Vec<String>),
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn changed(key: &str) -> Self {
        Condition::Changed(key.to_string())
    }

    pub fn any_changed(keys: &[&str]) -> Self {
        Condition::AnyChanged(keys.iter().map(|k| k.to_string()).collect())
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::All(mut all) => {
                all.push(other);
                Condition::All(all)
            }
            first => Condition::All(vec![first, other]),
        }
    }

    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Any(mut any) => {
                any.push(other);
                Condition::Any(any)
            }
            first => Condition::Any(vec![first, other]),
        }
    }

    pub fn evaluate(&self, fields: &Fields<'_>) -> bool {
        match self {
            Condition::IsNew => fields.is_new(),
            Condition::Changed(key) => fields.has_change(key),
            Condition::AnyChanged(keys) => keys.iter().any(|k| fields.has_change(k)),
            Condition::Not(inner) => !inner.evaluate(fields),
            Condition::All(all) => all.iter().all(|c| c.evaluate(fields)),
            Condition::Any(any) => any.iter().any(|c| c.evaluate(fields)),
        }
    }
}
