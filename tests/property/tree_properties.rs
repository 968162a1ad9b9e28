//! Properties of normalization, listing and collision resolution

use hff::tree::{list_children, normalize, unique_destination, KeySet};
use proptest::prelude::*;

fn raw_path() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r"[ ./\\a-c]{0,16}").unwrap()
}

fn key() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r"[a-c]{1,2}(/[a-c.]{1,3}){0,3}").unwrap()
}

fn key_set() -> impl Strategy<Value = KeySet> {
    proptest::collection::vec(key(), 0..24).prop_map(|keys| keys.into_iter().collect())
}

/// normalize is idempotent and yields repo-relative keys
#[test]
fn test_normalize_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&raw_path(), |raw| {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(!once.starts_with('/'));
            prop_assert!(!once.ends_with('/'));
            prop_assert!(!once.contains('\\'));
            Ok(())
        })
        .unwrap();
}

/// Children have no inner '/', and directory children have keys beneath them
#[test]
fn test_list_children_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(key_set(), proptest::option::of(key())), |(keys, base)| {
            let base = base.unwrap_or_default();
            for child in list_children(&keys, &base) {
                let name = child.strip_suffix('/').unwrap_or(&child);
                prop_assert!(!name.is_empty());
                prop_assert!(!name.contains('/'));
                if child.ends_with('/') {
                    let prefix = if base.is_empty() {
                        child.clone()
                    } else {
                        format!("{}/{}", base, child)
                    };
                    let has_keys = keys.with_prefix(&prefix).next().is_some();
                    prop_assert!(has_keys);
                }
            }
            Ok(())
        })
        .unwrap();
}

/// unique_destination never returns a taken key and keeps free keys as-is
#[test]
fn test_unique_destination_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(key_set(), key()), |(keys, desired)| {
            let chosen = unique_destination(&desired, &keys);
            prop_assert!(!keys.contains(&chosen));
            if !keys.contains(&desired) {
                prop_assert_eq!(chosen, desired);
            } else {
                let dup_prefix = format!("{}__dup", desired);
                prop_assert!(chosen.starts_with(&dup_prefix));
            }
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// Taking every key with a duplicate suffix still yields a fresh one
    #[test]
    fn dup_suffixes_are_skipped(n in 0usize..8) {
        let mut keys: KeySet = ["f.txt"].into_iter().collect();
        for i in 1..=n {
            keys.insert(format!("f.txt__dup{}", i));
        }
        prop_assert_eq!(unique_destination("f.txt", &keys), format!("f.txt__dup{}", n + 1));
    }
}
