//! Repository key normalization utilities

/// Normalize a user supplied path into a repository key (without backend access)
///
/// This function:
/// 1. Trims surrounding whitespace
/// 2. Converts `\` separators to `/`
/// 3. Strips leading `./` segments and leading slashes
/// 4. Removes trailing slashes
///
/// The result is repo-relative and never starts or ends with `/`.
pub fn normalize(raw: &str) -> String {
    let mut path = raw.replace('\\', "/");
    loop {
        let next = strip_once(&path);
        if next == path {
            return path;
        }
        path = next;
    }
}

fn strip_once(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let trimmed = if trimmed == "." { "" } else { trimmed };
    trimmed.trim_end_matches('/').to_string()
}

/// A normalized path plus the directory intent carried by a trailing separator.
///
/// `a/b/` and `a/b` normalize to the same key, but the first one asks for
/// "everything under `a/b`" (or "into `a/b`"). The intent is read off the raw
/// input because normalization discards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    pub key: String,
    pub dir_intent: bool,
}

impl PathRequest {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self {
            key: normalize(trimmed),
            dir_intent: trimmed.ends_with('/') || trimmed.ends_with('\\'),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Parent directory of a normalized key ("" for top-level keys).
pub fn parent_dir(key: &str) -> &str {
    match key.rfind('/') {
        Some(idx) => &key[..idx],
        None => "",
    }
}

/// Last segment of a normalized key.
pub fn base_name(key: &str) -> &str {
    match key.rfind('/') {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}

/// Join a directory key and a relative name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
