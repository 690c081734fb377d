//! Declared configuration state
//!
//! The host hands every operation two immutable trees: what was declared
//! before and what is declared now. Everything in this module is a pure
//! function over that pair.
//!
//! - [`value`] - The declared tree and its values
//! - [`fields`] - Conditional field accessor (changed-only reads)
//! - [`condition`] - Eligibility predicates for companion fields
//! - [`patch`] - Tri-state payload fields (absent / null / value)
//! - [`reconcile`] - Add/remove change sets for set-valued relationships
//! - [`flatten`] - Builder for remote -> declared conversions

pub mod condition;
pub mod fields;
pub mod flatten;
pub mod patch;
pub mod reconcile;
pub mod value;

pub use condition::Condition;
pub use fields::Fields;
pub use flatten::Flattener;
pub use patch::Patch;
pub use reconcile::ChangeSet;
pub use value::{tree_from_json, tree_to_json, ConfigValue, Tree};
