//! Directory emulation over a flat key listing.
//!
//! A directory exists when some key lives under it. An empty directory is kept
//! visible by a marker file, `<dir>/.gitkeep`.

use crate::backend::Operation;
use crate::tree::keyset::KeySet;
use crate::tree::path::{join, normalize};
use std::collections::BTreeSet;

/// File name of the marker that materializes an otherwise empty directory.
pub const DIR_MARKER: &str = ".gitkeep";

/// Operations needed for `dir` to exist.
///
/// Returns one `Add` for the marker when it is missing and records the marker in
/// `existing`, so a second call in the same planning pass returns nothing.
pub fn ensure_directory(existing: &mut KeySet, dir: &str) -> Vec<Operation> {
    let dir = normalize(dir);
    if dir.is_empty() {
        return Vec::new();
    }
    let marker = join(&dir, DIR_MARKER);
    if existing.contains(&marker) {
        return Vec::new();
    }
    existing.insert(marker.clone());
    vec![Operation::add(marker, Vec::new())]
}

/// True if `dir` is the root or some key lives under it.
pub fn directory_exists(existing: &KeySet, dir: &str) -> bool {
    if dir.is_empty() {
        return true;
    }
    let prefix = format!("{}/", dir);
    let found = existing.with_prefix(&prefix).next().is_some();
    found
}

/// Immediate children of `base`. Directories carry a trailing `/`.
///
/// Markers are not reported as children themselves; they only make their
/// directory visible from the level above.
pub fn list_children(existing: &KeySet, base: &str) -> BTreeSet<String> {
    let prefix = if base.is_empty() {
        String::new()
    } else {
        format!("{}/", base)
    };

    let mut children = BTreeSet::new();
    for key in existing.with_prefix(&prefix) {
        let rest = &key[prefix.len()..];
        if rest.is_empty() {
            continue;
        }
        match rest.split_once('/') {
            Some((first, _)) if !first.is_empty() => {
                children.insert(format!("{}/", first));
            }
            Some(_) => {}
            None if rest == DIR_MARKER => {}
            None => {
                children.insert(rest.to_string());
            }
        }
    }
    children
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> KeySet {
        list.iter().copied().collect()
    }

    #[test]
    fn test_ensure_directory_adds_marker_once() {
        let mut existing = keys(&["a/file.txt"]);
        let ops = ensure_directory(&mut existing, "a/b");
        assert_eq!(ops, vec![Operation::add("a/b/.gitkeep", Vec::new())]);
        assert!(existing.contains("a/b/.gitkeep"));

        let again = ensure_directory(&mut existing, "a/b/");
        assert!(again.is_empty());
    }

    #[test]
    fn test_ensure_root_is_noop() {
        let mut existing = KeySet::new();
        assert!(ensure_directory(&mut existing, "").is_empty());
        assert!(ensure_directory(&mut existing, "/").is_empty());
        assert!(existing.is_empty());
    }

    #[test]
    fn test_list_children_root() {
        let existing = keys(&["README.md", "a/b/c.txt", "a/d.txt", "z/.gitkeep"]);
        let children: Vec<String> = list_children(&existing, "").into_iter().collect();
        assert_eq!(children, vec!["README.md", "a/", "z/"]);
    }

    #[test]
    fn test_list_children_nested_hides_marker() {
        let existing = keys(&["a/.gitkeep", "a/b/.gitkeep", "a/x.txt", "ab/y.txt"]);
        let children: Vec<String> = list_children(&existing, "a").into_iter().collect();
        assert_eq!(children, vec!["b/", "x.txt"]);
    }

    #[test]
    fn test_list_children_marker_only_is_empty() {
        let existing = keys(&["a/b/.gitkeep"]);
        assert!(list_children(&existing, "a/b").is_empty());
        assert!(list_children(&existing, "missing").is_empty());
    }

    #[test]
    fn test_directory_exists() {
        let existing = keys(&["a/b/c.txt"]);
        assert!(directory_exists(&existing, ""));
        assert!(directory_exists(&existing, "a"));
        assert!(directory_exists(&existing, "a/b"));
        assert!(!directory_exists(&existing, "a/b/c.txt"));
        assert!(!directory_exists(&existing, "ab"));
    }
}
