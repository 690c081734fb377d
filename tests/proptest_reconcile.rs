//! Property-based tests using proptest
//!
//! These tests verify set reconciliation and the conditional field accessor
//! using randomized declared snapshots.

use idpsync::resource::{ConnectionKind, ResourceKind, RoleKind};
use idpsync::state::{tree_from_json, ChangeSet, ConfigValue, Fields, Patch, Tree};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

/// Small alphabet so generated sets overlap often
fn arb_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-f]", 0..6)
}

fn arb_scalar() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        any::<bool>().prop_map(ConfigValue::Bool),
        (-1000i64..1000).prop_map(ConfigValue::Int),
        "[a-z]{0,8}".prop_map(ConfigValue::String),
    ]
}

/// Flat declared tree over a fixed key space
fn arb_tree() -> impl Strategy<Value = Tree> {
    prop::collection::btree_map(
        prop_oneof!["name", "display_name", "description", "enabled", "priority"]
            .prop_map(String::from),
        arb_scalar(),
        0..5,
    )
}

fn arb_permissions() -> impl Strategy<Value = ConfigValue> {
    prop::collection::btree_set(("[a-c]", "read:[a-d]"), 0..5).prop_map(|perms| {
        ConfigValue::List(
            perms
                .into_iter()
                .map(|(api, name)| {
                    let mut entry = Tree::new();
                    entry.insert(
                        "resource_server_identifier".into(),
                        ConfigValue::String(format!("https://{api}")),
                    );
                    entry.insert("name".into(), ConfigValue::String(name));
                    ConfigValue::Map(entry)
                })
                .collect(),
        )
    })
}

proptest! {
    /// Applying the diff to the old set yields the new set
    #[test]
    fn diff_moves_previous_to_next(previous in arb_set(), next in arb_set()) {
        let change = ChangeSet::diff(&previous, &next);
        prop_assert_eq!(change.apply_to(&previous), next);
    }

    /// Additions and removals never overlap and only touch the symmetric difference
    #[test]
    fn diff_is_disjoint_and_minimal(previous in arb_set(), next in arb_set()) {
        let change = ChangeSet::diff(&previous, &next);
        prop_assert!(change.to_add.is_disjoint(&change.to_remove));
        prop_assert!(change.to_add.is_disjoint(&previous));
        prop_assert!(change.to_remove.is_subset(&previous));
        prop_assert!(change.to_add.is_subset(&next));
    }

    #[test]
    fn diff_of_equal_sets_is_empty(set in arb_set()) {
        prop_assert!(ChangeSet::diff(&set, &set).is_empty());
    }

    /// Reversing the direction swaps additions and removals
    #[test]
    fn diff_is_antisymmetric(previous in arb_set(), next in arb_set()) {
        let forward = ChangeSet::diff(&previous, &next);
        let backward = ChangeSet::diff(&next, &previous);
        prop_assert_eq!(forward.to_add, backward.to_remove);
        prop_assert_eq!(forward.to_remove, backward.to_add);
    }

    /// An update between identical trees has nothing eligible
    #[test]
    fn unchanged_tree_has_no_eligible_fields(tree in arb_tree()) {
        let fields = Fields::new(Some(&tree), &tree);
        prop_assert!(fields.changed_keys().is_empty());
        for key in tree.keys() {
            prop_assert!(!fields.has_change(key));
        }
    }

    /// On create every declared key is eligible and nothing else is
    #[test]
    fn create_makes_every_declared_key_eligible(tree in arb_tree()) {
        let fields = Fields::new(None, &tree);
        let declared: BTreeSet<String> = tree.keys().cloned().collect();
        prop_assert_eq!(fields.changed_keys(), declared);
    }

    /// A removed key reads as Null; an added or modified one as its value
    #[test]
    fn eligible_fields_follow_the_desired_tree(previous in arb_tree(), desired in arb_tree()) {
        let fields = Fields::new(Some(&previous), &desired);
        for key in fields.changed_keys() {
            match desired.get(&key) {
                None => prop_assert!(previous.contains_key(&key)),
                Some(value) => prop_assert_ne!(previous.get(&key), Some(value)),
            }
        }
        if let Ok(name) = fields.string("name") {
            match (previous.get("name"), desired.get("name")) {
                (p, d) if p == d => prop_assert_eq!(name, Patch::Absent),
                (Some(_), None) => prop_assert_eq!(name, Patch::Null),
                (_, Some(ConfigValue::String(s))) => prop_assert_eq!(name, Patch::Value(s.clone())),
                _ => {}
            }
        }
    }

    /// The same snapshot pair always produces the same payload
    #[test]
    fn role_payload_is_deterministic(previous in arb_tree(), desired in arb_tree()) {
        let first = RoleKind.payload(&Fields::new(Some(&previous), &desired));
        let second = RoleKind.payload(&Fields::new(Some(&previous), &desired));
        prop_assert_eq!(first.ok(), second.ok());
    }

    /// Permission relationship calls never add and remove the same entry
    #[test]
    fn permission_calls_are_disjoint(previous in arb_permissions(), desired in arb_permissions()) {
        let mut prev_tree = Tree::new();
        prev_tree.insert("name".into(), ConfigValue::from("admin"));
        let mut next_tree = prev_tree.clone();
        prev_tree.insert("permissions".into(), previous.clone());
        next_tree.insert("permissions".into(), desired.clone());

        let syncs = RoleKind
            .relationships(&Fields::new(Some(&prev_tree), &next_tree))
            .unwrap();
        if previous == desired {
            prop_assert!(syncs.is_empty());
        }
        for sync in syncs {
            let listed = |body: &Option<serde_json::Value>| -> BTreeSet<String> {
                body.as_ref()
                    .and_then(|b| b["permissions"].as_array().cloned())
                    .unwrap_or_default()
                    .iter()
                    .map(|p| p.to_string())
                    .collect()
            };
            prop_assert!(listed(&sync.additions).is_disjoint(&listed(&sync.removals)));
        }
    }

    /// Re-sending an unchanged connection never produces a payload
    #[test]
    fn unchanged_connection_payload_is_empty(token in "[a-z0-9]{1,12}", sid in "AC[0-9]{1,6}") {
        let declared = tree_from_json(json!({
            "name": "sms-login",
            "strategy": "sms",
            "options": {"twilio_sid": sid, "twilio_token": token},
        }))
        .unwrap();
        let payload = ConnectionKind
            .payload(&Fields::new(Some(&declared), &declared))
            .unwrap();
        prop_assert!(payload.as_object().map_or(true, |o| o.is_empty()));
    }
}
