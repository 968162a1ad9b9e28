//! Local side of transfers: expanding `put` inputs and placing downloads.

use crate::error::ApiError;
use crate::tree::{has_glob, GlobPattern};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Local files named by `pattern`, sorted.
///
/// A literal path must be an existing file. A glob walks its static leading
/// directory no deeper than the pattern itself, so `data/*.txt` does not reach
/// into `data/sub/`.
pub fn expand_local(pattern: &str) -> Result<Vec<PathBuf>, ApiError> {
    let pattern = pattern.trim();
    if !has_glob(pattern) {
        let path = PathBuf::from(pattern);
        if path.is_file() {
            return Ok(vec![path]);
        }
        return Err(ApiError::NotFound(format!("local file {}", pattern)));
    }

    let pattern = pattern.replace('\\', "/");
    let parts: Vec<&str> = pattern.split('/').collect();
    let static_len = parts.iter().take_while(|p| !has_glob(p)).count();
    let base = match parts[..static_len].join("/") {
        b if b.is_empty() && pattern.starts_with('/') => "/".to_string(),
        b => b,
    };
    let depth = parts.len() - static_len;
    let root = if base.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(&base)
    };

    let glob = GlobPattern::new(&pattern)?;
    let mut matches = Vec::new();
    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let Ok(rel) = entry.path().strip_prefix(&root) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        let candidate = if base.is_empty() {
            rel
        } else if base.ends_with('/') {
            format!("{}{}", base, rel)
        } else {
            format!("{}/{}", base, rel)
        };
        if glob.is_match(&candidate) {
            matches.push(entry.into_path());
        }
    }

    if matches.is_empty() {
        return Err(ApiError::NoMatch(pattern));
    }
    matches.sort();
    debug!(pattern = %pattern, count = matches.len(), "Expanded local glob");
    Ok(matches)
}

/// How a downloaded file reached its output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Moved out of the cache with a rename.
    Renamed,
    /// Copied; the cache keeps (or no longer holds) its own copy.
    Copied,
    /// Copied across devices, but the cached file could not be removed.
    CopiedCleanupFailed { leftover: PathBuf, reason: String },
}

/// Put `cached` at `out`, creating parent directories.
///
/// With `move_file`, a rename is tried first; a cross-device rename falls back
/// to copy then delete of the cached file.
pub fn place_file(cached: &Path, out: &Path, move_file: bool) -> Result<Placement, ApiError> {
    place_file_with(cached, out, move_file, FileOps::SYSTEM)
}

/// Filesystem steps used to move a cached file into place.
#[derive(Clone, Copy)]
struct FileOps {
    rename: fn(&Path, &Path) -> io::Result<()>,
    remove: fn(&Path) -> io::Result<()>,
}

impl FileOps {
    const SYSTEM: FileOps = FileOps {
        rename: system_rename,
        remove: system_remove,
    };
}

fn system_rename(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::rename(from, to)
}

fn system_remove(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}

fn place_file_with(
    cached: &Path,
    out: &Path,
    move_file: bool,
    ops: FileOps,
) -> Result<Placement, ApiError> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if !move_file {
        std::fs::copy(cached, out)?;
        return Ok(Placement::Copied);
    }

    match (ops.rename)(cached, out) {
        Ok(()) => Ok(Placement::Renamed),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!(from = %cached.display(), to = %out.display(), "Rename crosses devices, copying");
            std::fs::copy(cached, out)?;
            match (ops.remove)(cached) {
                Ok(()) => Ok(Placement::Copied),
                Err(e) => {
                    warn!(path = %cached.display(), error = %e, "Could not remove cached file");
                    Ok(Placement::CopiedCleanupFailed {
                        leftover: cached.to_path_buf(),
                        reason: e.to_string(),
                    })
                }
            }
        }
        Err(e) => Err(e.into()),
    }
}
