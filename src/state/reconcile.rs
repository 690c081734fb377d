//! Set reconciliation between two declared snapshots

use std::collections::BTreeSet;

/// Elements to add and remove to move a relationship from the previously
/// declared set to the newly declared one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<T: Ord> {
    pub to_add: BTreeSet<T>,
    pub to_remove: BTreeSet<T>,
}

impl<T: Ord> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            to_add: BTreeSet::new(),
            to_remove: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Clone> ChangeSet<T> {
    /// `to_add = next - previous`, `to_remove = previous - next`
    pub fn diff(previous: &BTreeSet<T>, next: &BTreeSet<T>) -> Self {
        Self {
            to_add: next.difference(previous).cloned().collect(),
            to_remove: previous.difference(next).cloned().collect(),
        }
    }

    /// Apply this change set to `base`, removals first
    pub fn apply_to(&self, base: &BTreeSet<T>) -> BTreeSet<T> {
        let mut result: BTreeSet<T> = base.difference(&self.to_remove).cloned().collect();
        result.extend(self.to_add.iter().cloned());
        result
    }
}

impl<T: Ord> ChangeSet<T> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn map<U: Ord>(self, mut f: impl FnMut(T) -> U) -> ChangeSet<U> {
        ChangeSet {
            to_add: self.to_add.into_iter().map(&mut f).collect(),
            to_remove: self.to_remove.into_iter().map(&mut f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_add_and_remove() {
        let change = ChangeSet::diff(&set(&["r1", "r2"]), &set(&["r2", "r3"]));
        assert_eq!(change.to_add, set(&["r3"]));
        assert_eq!(change.to_remove, set(&["r1"]));
        assert!(!change.is_empty());
    }

    #[test]
    fn test_diff_identical_sets_is_empty() {
        let change = ChangeSet::diff(&set(&["a", "b"]), &set(&["b", "a"]));
        assert!(change.is_empty());
    }

    #[test]
    fn test_diff_from_nothing_adds_everything() {
        let change = ChangeSet::diff(&BTreeSet::new(), &set(&["a", "b"]));
        assert_eq!(change.to_add, set(&["a", "b"]));
        assert!(change.to_remove.is_empty());
    }

    #[test]
    fn test_apply_reaches_next() {
        let prev = set(&["a", "b", "c"]);
        let next = set(&["c", "d"]);
        assert_eq!(ChangeSet::diff(&prev, &next).apply_to(&prev), next);
    }
}
