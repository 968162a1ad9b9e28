//! Shell-style glob matching over flat keys.
//!
//! Patterns compile to an anchored regex. `*` matches any run of characters,
//! including `/`; keys are flat strings, so there is no per-segment matching.

use crate::error::ApiError;
use crate::tree::keyset::KeySet;
use crate::tree::path::normalize;
use regex::Regex;

/// True if `s` contains a glob metacharacter (`*`, `?` or `[`).
pub fn has_glob(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a pattern as given (no normalization).
    pub fn new(pattern: &str) -> Result<Self, ApiError> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| {
            ApiError::InvalidArgument(format!("invalid glob pattern {}: {}", pattern, e))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Keys matching the normalized `pattern`, sorted.
pub fn match_glob(keys: &KeySet, pattern: &str) -> Result<Vec<String>, ApiError> {
    let glob = GlobPattern::new(&normalize(pattern))?;
    Ok(keys
        .iter()
        .filter(|k| glob.is_match(k))
        .map(str::to_string)
        .collect())
}

fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push_str(".*");
                i += 1;
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            '[' => match parse_class(&chars, i) {
                Some((class, next)) => {
                    out.push_str(&class);
                    i = next;
                }
                None => {
                    out.push_str("\\[");
                    i += 1;
                }
            },
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Translate the bracket expression starting at `chars[start] == '['`.
/// Returns the regex class and the index after the closing `]`, or `None` when
/// the bracket is never closed.
fn parse_class(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start + 1;
    let mut class = String::from("[");

    if i < chars.len() && (chars[i] == '!' || chars[i] == '^') {
        class.push('^');
        i += 1;
    }

    let body_start = i;
    while i < chars.len() {
        let c = chars[i];
        if c == ']' && i > body_start {
            class.push(']');
            return Some((class, i + 1));
        }
        let is_range = c == '-' && i > body_start && i + 1 < chars.len() && chars[i + 1] != ']';
        if is_range {
            class.push('-');
        } else {
            if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
                class.push('\\');
            }
            class.push(c);
        }
        i += 1;
    }
    None
}
