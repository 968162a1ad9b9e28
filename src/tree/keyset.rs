//! KeySet: sorted snapshot of every key stored in a repository.

use std::collections::BTreeSet;

/// All repository keys at one point in time.
///
/// Fetched once per command, then mutated in memory while a plan is built so that
/// later decisions (collisions, markers) see earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: BTreeSet<String>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns true if the key was not present before.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Keys starting with `prefix`, in sorted order. Uses a range scan.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keys
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |k| k.starts_with(prefix))
            .map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.keys.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for KeySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.keys.extend(iter.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scan_is_sorted_and_bounded() {
        let keys: KeySet = ["a/x", "a/b/y", "ab", "b/z", "a/"].into_iter().collect();
        let under: Vec<&str> = keys.with_prefix("a/").collect();
        assert_eq!(under, vec!["a/", "a/b/y", "a/x"]);
        assert_eq!(keys.with_prefix("c/").count(), 0);
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut keys = KeySet::new();
        assert!(keys.insert("a"));
        assert!(!keys.insert("a"));
        assert_eq!(keys.len(), 1);
        assert!(keys.remove("a"));
        assert!(keys.is_empty());
    }
}
