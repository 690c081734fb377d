//! Builder for flattened (remote -> declared) trees

use super::fields::as_string_set;
use super::patch::Patch;
use super::value::{ConfigValue, Tree};
use std::collections::BTreeSet;

/// Collects flattened fields into a [`Tree`].
///
/// `local` is the declared tree the remote value is being reconciled with;
/// write-only fields are copied from it instead of from the response.
pub struct Flattener<'a> {
    out: Tree,
    local: &'a Tree,
}

impl<'a> Flattener<'a> {
    pub fn new(local: &'a Tree) -> Self {
        Self {
            out: Tree::new(),
            local,
        }
    }

    /// Copy a remote value; absent and null leave the field unset
    pub fn put<T>(&mut self, key: &str, value: &Patch<T>) -> &mut Self
    where
        T: Clone + Into<ConfigValue>,
    {
        if let Patch::Value(v) = value {
            self.out.insert(key.to_string(), v.clone().into());
        }
        self
    }

    /// Copy a value the API withholds on read from the local declaration
    pub fn put_write_only(&mut self, key: &str) -> &mut Self {
        if let Some(v) = self.local.get(key) {
            self.out.insert(key.to_string(), v.clone());
        }
        self
    }

    /// Nested block; empty blocks are left unset
    pub fn put_block(&mut self, key: &str, block: Tree) -> &mut Self {
        if !block.is_empty() {
            self.out.insert(key.to_string(), ConfigValue::Map(block));
        }
        self
    }

    /// Nested block flattened against its own local declaration
    pub fn put_nested<T>(
        &mut self,
        key: &str,
        value: &Patch<T>,
        flatten: impl FnOnce(&T, &Tree) -> Tree,
    ) -> &mut Self {
        if let Patch::Value(v) = value {
            let block = flatten(v, self.local_block(key));
            self.put_block(key, block);
        }
        self
    }

    /// Set-valued field. A local declaration with the same members is kept
    /// as declared, list order included; empty sets otherwise stay unset.
    pub fn put_set(&mut self, key: &str, set: BTreeSet<String>) -> &mut Self {
        match self.local.get(key) {
            Some(local) if as_string_set(local).as_ref() == Some(&set) => {
                self.out.insert(key.to_string(), local.clone());
            }
            _ if set.is_empty() => {}
            _ => {
                self.out.insert(key.to_string(), ConfigValue::Set(set));
            }
        }
        self
    }

    /// Optional set; absent and null read as empty
    pub fn put_set_patch(&mut self, key: &str, set: &Patch<BTreeSet<String>>) -> &mut Self {
        self.put_set(key, set.value().cloned().unwrap_or_default())
    }

    pub fn put_map_list(&mut self, key: &str, items: &Patch<Vec<Tree>>) -> &mut Self {
        if let Patch::Value(items) = items {
            self.out.insert(
                key.to_string(),
                ConfigValue::List(items.iter().cloned().map(ConfigValue::Map).collect()),
            );
        }
        self
    }

    /// The declared value of a nested block, for recursive flattening
    pub fn local_block(&self, key: &str) -> &'a Tree {
        static EMPTY: Tree = Tree::new();
        self.local
            .get(key)
            .and_then(ConfigValue::as_map)
            .unwrap_or(&EMPTY)
    }

    pub fn finish(&mut self) -> Tree {
        std::mem::take(&mut self.out)
    }
}
