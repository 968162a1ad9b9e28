//! Pure planning over a working KeySet.
//!
//! Each function turns one filesystem-style request into the operations of a
//! single commit. Nothing here talks to a backend; the command service fetches
//! the KeySet, calls a planner and submits the result.

use crate::backend::Operation;
use crate::error::ApiError;
use crate::tree::{
    base_name, ensure_directory, has_glob, join, list_children, match_glob, parent_dir,
    unique_destination, KeySet, PathRequest, DIR_MARKER,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Entries `ls` prints for `raw`, in order. Empty means `(empty)`.
pub fn list_entries(keys: &KeySet, raw: &str) -> Result<Vec<String>, ApiError> {
    let request = PathRequest::parse(raw);
    if request.is_empty() {
        return Ok(list_children(keys, "").into_iter().collect());
    }
    if has_glob(&request.key) {
        return Ok(match_glob(keys, &request.key)?
            .into_iter()
            .filter(|k| base_name(k) != DIR_MARKER)
            .collect());
    }
    Ok(list_children(keys, &request.key)
        .into_iter()
        .map(|child| join(&request.key, &child))
        .collect())
}

/// Directory creation plan. `operations` is empty when the marker already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MkdirPlan {
    pub dir: String,
    pub operations: Vec<Operation>,
}

impl MkdirPlan {
    pub fn message(&self) -> String {
        format!("mkdir {}", self.dir)
    }
}

pub fn plan_mkdir(keys: &KeySet, raw: &str) -> Result<MkdirPlan, ApiError> {
    let request = PathRequest::parse(raw);
    if request.is_empty() {
        return Err(ApiError::InvalidArgument(
            "mkdir needs a non-empty path".to_string(),
        ));
    }
    let mut working = keys.clone();
    let operations = ensure_directory(&mut working, &request.key);
    Ok(MkdirPlan {
        dir: request.key,
        operations,
    })
}

/// How a delete request selected its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    Exact,
    Prefix,
    Glob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    pub scope: DeleteScope,
    pub targets: Vec<String>,
    pub message: String,
}

impl DeletePlan {
    /// Prefix and glob deletes can remove many keys and need confirmation.
    pub fn needs_confirmation(&self) -> bool {
        self.scope != DeleteScope::Exact
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.targets.iter().map(Operation::delete).collect()
    }
}

pub fn plan_delete(keys: &KeySet, raw: &str) -> Result<DeletePlan, ApiError> {
    let request = PathRequest::parse(raw);
    if request.is_empty() {
        return Err(ApiError::InvalidArgument(
            "rm needs a non-empty path".to_string(),
        ));
    }

    let (scope, targets) = if has_glob(&request.key) {
        (DeleteScope::Glob, match_glob(keys, &request.key)?)
    } else if request.dir_intent {
        let prefix = format!("{}/", request.key);
        let targets = keys.with_prefix(&prefix).map(str::to_string).collect();
        (DeleteScope::Prefix, targets)
    } else if keys.contains(&request.key) {
        (DeleteScope::Exact, vec![request.key.clone()])
    } else {
        return Err(ApiError::NotFound(request.key));
    };

    if targets.is_empty() {
        return Err(ApiError::NoMatch(raw.trim().to_string()));
    }
    Ok(DeletePlan {
        scope,
        targets,
        message: format!("rm {}", raw.trim()),
    })
}

/// Move plan: one commit of copies, deletes and directory markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// `(source, final destination)` per moved file, in source order.
    pub moves: Vec<(String, String)>,
    pub operations: Vec<Operation>,
    pub message: String,
}

pub fn plan_move(keys: &KeySet, src_raw: &str, dst_raw: &str) -> Result<MovePlan, ApiError> {
    let src = PathRequest::parse(src_raw);
    let dst = PathRequest::parse(dst_raw);
    if src.is_empty() || dst.is_empty() {
        return Err(ApiError::InvalidArgument(
            "mv needs a non-empty source and destination".to_string(),
        ));
    }
    if src.dir_intent {
        plan_subtree_move(keys, &src.key, &dst.key)
    } else {
        plan_file_move(keys, &src.key, &dst)
    }
}

fn plan_file_move(keys: &KeySet, src: &str, dst: &PathRequest) -> Result<MovePlan, ApiError> {
    if !keys.contains(src) {
        return Err(ApiError::NotFound(src.to_string()));
    }
    let desired = if dst.dir_intent {
        join(&dst.key, base_name(src))
    } else {
        dst.key.clone()
    };
    if desired == src {
        return Err(ApiError::InvalidArgument(format!(
            "{} is both source and destination",
            src
        )));
    }

    let mut working = keys.clone();
    let mut operations = ensure_directory(&mut working, parent_dir(&desired));
    let destination = unique_destination(&desired, &working);
    working.insert(destination.clone());
    operations.push(Operation::copy(src, destination.as_str()));
    operations.push(Operation::delete(src));

    Ok(MovePlan {
        message: format!("mv {} -> {}", src, destination),
        moves: vec![(src.to_string(), destination)],
        operations,
    })
}

fn plan_subtree_move(keys: &KeySet, src: &str, dst: &str) -> Result<MovePlan, ApiError> {
    if dst == src || dst.starts_with(&format!("{}/", src)) {
        return Err(ApiError::InvalidArgument(format!(
            "cannot move {}/ into itself",
            src
        )));
    }
    let prefix = format!("{}/", src);
    let sources: Vec<String> = keys.with_prefix(&prefix).map(str::to_string).collect();
    if sources.is_empty() {
        return Err(ApiError::NoMatch(prefix));
    }

    // Every source leaves, so none of them blocks a destination.
    let mut working = keys.clone();
    for source in &sources {
        working.remove(source);
    }
    let mut ensured: HashSet<String> = HashSet::new();
    let mut operations = Vec::new();
    let mut moves = Vec::with_capacity(sources.len());

    for source in &sources {
        let desired = join(dst, &source[prefix.len()..]);
        let parent = parent_dir(&desired);
        if ensured.insert(parent.to_string()) {
            operations.extend(ensure_directory(&mut working, parent));
        }

        // The destination directory already has its marker.
        if base_name(source) == DIR_MARKER && working.contains(&desired) {
            continue;
        }

        let destination = unique_destination(&desired, &working);
        working.insert(destination.clone());
        operations.push(Operation::copy(source.as_str(), destination.as_str()));
        moves.push((source.clone(), destination));
    }

    // A source that this commit writes again stays in place.
    operations.extend(
        sources
            .iter()
            .filter(|source| !working.contains(source.as_str()))
            .map(Operation::delete),
    );

    Ok(MovePlan {
        moves,
        operations,
        message: format!("mv {}/ -> {}/", src, dst),
    })
}

/// One local file headed for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub local: PathBuf,
    pub dest: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutPlan {
    /// Target directory of the uploads ("" for the root).
    pub dir: String,
    /// Marker for `dir`, committed on its own before the uploads.
    pub mkdir: Vec<Operation>,
    pub uploads: Vec<Upload>,
}

/// Destinations for `files` under `dst_raw`.
pub fn plan_put(keys: &KeySet, files: &[PathBuf], dst_raw: &str) -> Result<PutPlan, ApiError> {
    let dst = PathRequest::parse(dst_raw);
    if files.len() > 1 && !dst.dir_intent {
        return Err(ApiError::InvalidArgument(format!(
            "{} local files matched; destination {} must end with '/'",
            files.len(),
            dst_raw.trim()
        )));
    }
    if dst.is_empty() && !dst.dir_intent {
        return Err(ApiError::InvalidArgument(
            "put needs a destination".to_string(),
        ));
    }

    let dir = if dst.dir_intent {
        dst.key.clone()
    } else {
        parent_dir(&dst.key).to_string()
    };

    let uploads = files
        .iter()
        .map(|local| {
            let dest = if dst.dir_intent {
                join(&dir, &local_file_name(local)?)
            } else {
                dst.key.clone()
            };
            Ok(Upload {
                local: local.clone(),
                dest,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let mut seen = HashSet::new();
    if let Some(clash) = uploads.iter().find(|u| !seen.insert(u.dest.as_str())) {
        return Err(ApiError::InvalidArgument(format!(
            "several local files would be written to {}",
            clash.dest
        )));
    }

    let mut working = keys.clone();
    let mkdir = ensure_directory(&mut working, &dir);
    Ok(PutPlan {
        dir,
        mkdir,
        uploads,
    })
}

fn local_file_name(path: &Path) -> Result<String, ApiError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ApiError::InvalidArgument(format!("{} has no file name", path.display())))
}
