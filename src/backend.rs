//! Repository Backend Abstraction
//!
//! The contract the filesystem layer needs from a hosted repository: a full flat
//! listing, atomic multi-operation commits, and single-file transfers. The hub
//! client talks to a Hugging Face compatible endpoint; the memory backend keeps
//! everything in process and is what the test-suite runs against.

use crate::error::BackendError;
use crate::tree::KeySet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod hub;
pub mod memory;

pub use hub::HubClient;
pub use memory::MemoryBackend;

/// Repository kind. Keys are unique per (repository, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    Model,
    Dataset,
}

impl RepoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoKind::Model => "model",
            RepoKind::Dataset => "dataset",
        }
    }

    /// Segment used by the REST API (`/api/models/...`, `/api/datasets/...`).
    pub fn api_segment(&self) -> &'static str {
        match self {
            RepoKind::Model => "models",
            RepoKind::Dataset => "datasets",
        }
    }

    /// Prefix used by download and git URLs (models have none).
    pub fn url_prefix(&self) -> &'static str {
        match self {
            RepoKind::Model => "",
            RepoKind::Dataset => "datasets/",
        }
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(RepoKind::Model),
            "dataset" => Ok(RepoKind::Dataset),
            other => Err(format!("unknown repo type '{}' (expected model or dataset)", other)),
        }
    }
}

/// Repository coordinates passed to every backend call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// `owner/name`
    pub id: String,
    pub kind: RepoKind,
}

impl RepoRef {
    pub fn new(id: impl Into<String>, kind: RepoKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Validate the `owner/name` shape.
    pub fn validate(&self) -> Result<(), String> {
        match self.id.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(())
            }
            _ => Err(format!("--repo must be owner/name, got '{}'", self.id)),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.kind)
    }
}

/// One change inside an atomic commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add { key: String, content: Vec<u8> },
    Delete { key: String },
    Copy { from: String, to: String },
}

impl Operation {
    pub fn add(key: impl Into<String>, content: Vec<u8>) -> Self {
        Operation::Add {
            key: key.into(),
            content,
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Operation::Delete { key: key.into() }
    }

    pub fn copy(from: impl Into<String>, to: impl Into<String>) -> Self {
        Operation::Copy {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Key this operation writes or removes.
    pub fn target(&self) -> &str {
        match self {
            Operation::Add { key, .. } | Operation::Delete { key } => key,
            Operation::Copy { to, .. } => to,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add { key, content } => write!(f, "add {} ({} bytes)", key, content.len()),
            Operation::Delete { key } => write!(f, "delete {}", key),
            Operation::Copy { from, to } => write!(f, "copy {} -> {}", from, to),
        }
    }
}

/// Hosted repository operations consumed by the filesystem layer.
pub trait Backend {
    /// Every key in the repository (unpaginated from the caller's view).
    fn list_all_keys(&self, repo: &RepoRef) -> Result<KeySet, BackendError>;

    /// Apply `operations` atomically as one revision. Returns the revision id.
    fn commit(
        &self,
        repo: &RepoRef,
        operations: &[Operation],
        message: &str,
    ) -> Result<String, BackendError>;

    /// Upload one local file as its own revision.
    fn upload_file(
        &self,
        local: &Path,
        dest: &str,
        repo: &RepoRef,
        message: &str,
    ) -> Result<(), BackendError>;

    /// Download one key into the cache and return the cached path.
    fn download_file(
        &self,
        repo: &RepoRef,
        key: &str,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf, BackendError>;
}

/// Directory name used for a repository inside a download cache.
pub fn cache_folder_name(repo: &RepoRef) -> String {
    format!("{}s--{}", repo.kind.as_str(), repo.id.replace('/', "--"))
}
