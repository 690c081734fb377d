//! Variant Registry - discriminant-keyed expand/flatten dispatch
//!
//! Each polymorphic resource family (connection options keyed by strategy,
//! log stream sinks keyed by type) builds one registry on first access and
//! resolves the discriminant with a single lookup.

use crate::error::{Result, SyncError};
use crate::state::{Fields, Tree};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// A tagged union of variant shapes sharing one resource kind
pub trait VariantFamily: Sized + 'static {
    /// Name used in errors and logs, e.g. "connection strategy"
    const NAME: &'static str;
}

/// Injection into and projection out of the family's enum
pub trait Member<F>: Sized {
    fn wrap(self) -> F;

    fn unwrap(family: &F) -> Option<&Self>;
}

/// Implements [`Member`] for each `Enum::Variant(Type)` pair
macro_rules! variant_members {
    ($family:ident { $($variant:ident($ty:ty)),* $(,)? }) => {
        $(
            impl $crate::resource::registry::Member<$family> for $ty {
                fn wrap(self) -> $family {
                    $family::$variant(self)
                }

                #[allow(unreachable_patterns)]
                fn unwrap(family: &$family) -> Option<&Self> {
                    match family {
                        $family::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

pub(crate) use variant_members;

/// One variant shape of a family
pub trait Variant<F: VariantFamily>: Member<F> + Serialize + DeserializeOwned {
    /// Declared options -> remote payload, honoring change eligibility
    fn expand(fields: &Fields<'_>) -> Result<Self>;

    /// Remote representation -> declared options. `local` is the declared
    /// options block, used for fields the API does not return.
    fn flatten(&self, local: &Tree) -> Tree;
}

/// Function pointers for one discriminant
pub struct VariantHandler<F> {
    pub expand: fn(&Fields<'_>) -> Result<F>,
    pub decode: fn(serde_json::Value) -> Result<F>,
    pub flatten: fn(&F, &Tree) -> Result<Tree>,
}

impl<F> Clone for VariantHandler<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for VariantHandler<F> {}

impl<F: VariantFamily> VariantHandler<F> {
    pub fn of<V: Variant<F>>() -> Self {
        Self {
            expand: expand_variant::<F, V>,
            decode: decode_variant::<F, V>,
            flatten: flatten_variant::<F, V>,
        }
    }
}

fn expand_variant<F: VariantFamily, V: Variant<F>>(fields: &Fields<'_>) -> Result<F> {
    V::expand(fields).map(V::wrap)
}

fn decode_variant<F: VariantFamily, V: Variant<F>>(value: serde_json::Value) -> Result<F> {
    let value = if value.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        value
    };
    Ok(serde_json::from_value::<V>(value)?.wrap())
}

fn flatten_variant<F: VariantFamily, V: Variant<F>>(family: &F, local: &Tree) -> Result<Tree> {
    V::unwrap(family)
        .map(|variant| variant.flatten(local))
        .ok_or_else(|| SyncError::InvalidValue {
            field: F::NAME.to_string(),
            reason: "representation does not match its discriminant".to_string(),
        })
}

/// Discriminant -> handler map for one family
pub struct VariantRegistry<F> {
    handlers: BTreeMap<&'static str, VariantHandler<F>>,
}

impl<F: VariantFamily> Default for VariantRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: VariantFamily> VariantRegistry<F> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register `V` under `discriminant`.
    ///
    /// Panics on duplicates: two variants must never match one discriminant.
    pub fn with<V: Variant<F>>(mut self, discriminant: &'static str) -> Self {
        let previous = self.handlers.insert(discriminant, VariantHandler::of::<V>());
        assert!(
            previous.is_none(),
            "duplicate {} registered: {:?}",
            F::NAME,
            discriminant
        );
        self
    }

    /// Look up the handler for `discriminant`
    pub fn resolve(&self, discriminant: &str) -> Result<&VariantHandler<F>> {
        self.handlers
            .get(discriminant)
            .ok_or_else(|| SyncError::UnsupportedVariant {
                family: F::NAME,
                discriminant: discriminant.to_string(),
            })
    }

    pub fn contains(&self, discriminant: &str) -> bool {
        self.handlers.contains_key(discriminant)
    }

    /// All registered discriminants, sorted
    pub fn discriminants(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }
}
