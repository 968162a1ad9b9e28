//! In-process backend with atomic commit semantics.

use crate::backend::{cache_folder_name, Backend, Operation, RepoRef};
use crate::error::BackendError;
use crate::tree::KeySet;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

type Files = BTreeMap<String, Vec<u8>>;

/// A commit applied to a [`MemoryBackend`].
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub repo: RepoRef,
    pub revision: String,
    pub message: String,
    pub operations: Vec<Operation>,
}

/// Repository store kept entirely in memory.
///
/// Commits are all-or-nothing: operations run against a copy of the repository
/// and the copy replaces the original only if every operation succeeds. Copy
/// sources resolve against the parent revision, like the hub does.
pub struct MemoryBackend {
    repos: Mutex<HashMap<RepoRef, Files>>,
    commits: Mutex<Vec<CommitRecord>>,
    rejected_uploads: Mutex<HashSet<String>>,
    cache_root: PathBuf,
}

impl MemoryBackend {
    /// Downloads land under `cache_root` unless a cache dir is passed per call.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            repos: Mutex::new(HashMap::new()),
            commits: Mutex::new(Vec::new()),
            rejected_uploads: Mutex::new(HashSet::new()),
            cache_root: cache_root.into(),
        }
    }

    /// Store a file directly, outside of any commit.
    pub fn seed(&self, repo: &RepoRef, key: &str, content: impl Into<Vec<u8>>) {
        self.repos
            .lock()
            .entry(repo.clone())
            .or_default()
            .insert(key.to_string(), content.into());
    }

    pub fn file(&self, repo: &RepoRef, key: &str) -> Option<Vec<u8>> {
        self.repos.lock().get(repo).and_then(|f| f.get(key).cloned())
    }

    pub fn keys(&self, repo: &RepoRef) -> Vec<String> {
        self.repos
            .lock()
            .get(repo)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.commits.lock().clone()
    }

    /// Make every upload to `dest` fail with a rejection.
    pub fn reject_uploads_to(&self, dest: &str) {
        self.rejected_uploads.lock().insert(dest.to_string());
    }

    fn record(&self, repo: &RepoRef, operations: Vec<Operation>, message: &str) -> String {
        let mut commits = self.commits.lock();
        let revision = format!("{:040x}", commits.len() + 1);
        commits.push(CommitRecord {
            repo: repo.clone(),
            revision: revision.clone(),
            message: message.to_string(),
            operations,
        });
        revision
    }
}

fn rejected(message: String) -> BackendError {
    BackendError::Rejected {
        status: 404,
        message,
    }
}

impl Backend for MemoryBackend {
    fn list_all_keys(&self, repo: &RepoRef) -> Result<KeySet, BackendError> {
        Ok(self
            .repos
            .lock()
            .get(repo)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn commit(
        &self,
        repo: &RepoRef,
        operations: &[Operation],
        message: &str,
    ) -> Result<String, BackendError> {
        let mut repos = self.repos.lock();
        let parent = repos.get(repo).cloned().unwrap_or_default();
        let mut next = parent.clone();

        for op in operations {
            match op {
                Operation::Add { key, content } => {
                    next.insert(key.clone(), content.clone());
                }
                Operation::Delete { key } => {
                    if next.remove(key).is_none() {
                        return Err(rejected(format!("cannot delete {}: no such file", key)));
                    }
                }
                Operation::Copy { from, to } => {
                    let content = parent
                        .get(from)
                        .cloned()
                        .ok_or_else(|| rejected(format!("cannot copy {}: no such file", from)))?;
                    next.insert(to.clone(), content);
                }
            }
        }

        repos.insert(repo.clone(), next);
        drop(repos);
        Ok(self.record(repo, operations.to_vec(), message))
    }

    fn upload_file(
        &self,
        local: &Path,
        dest: &str,
        repo: &RepoRef,
        message: &str,
    ) -> Result<(), BackendError> {
        if self.rejected_uploads.lock().contains(dest) {
            return Err(BackendError::Rejected {
                status: 403,
                message: format!("upload to {} refused", dest),
            });
        }
        let content = std::fs::read(local)?;
        let op = Operation::add(dest, content);
        self.commit(repo, std::slice::from_ref(&op), message)?;
        Ok(())
    }

    fn download_file(
        &self,
        repo: &RepoRef,
        key: &str,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf, BackendError> {
        let content = self
            .file(repo, key)
            .ok_or_else(|| BackendError::NotFound(key.to_string()))?;
        let root = cache_dir.unwrap_or(&self.cache_root);
        let path = root.join(cache_folder_name(repo)).join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
