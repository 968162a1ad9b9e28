//! Deterministic collision suffixing for destination keys.

use crate::tree::keyset::KeySet;

/// Pick a free key for `desired`: the key itself, else `desired__dup1`,
/// `desired__dup2`, ... (first free one).
pub fn unique_destination(desired: &str, existing: &KeySet) -> String {
    if !existing.contains(desired) {
        return desired.to_string();
    }
    let mut i: u64 = 1;
    loop {
        let candidate = format!("{}__dup{}", desired, i);
        if !existing.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}
