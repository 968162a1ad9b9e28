//! Snapshot command service: create, list, show, get and destroy by id.

use crate::archive::{create_archive, extract_archive, Compression};
use crate::backend::{Backend, Operation, RepoRef};
use crate::error::ApiError;
use crate::prompt::{require_confirmation, ConfirmPrompt};
use crate::snapshot::id::new_snapshot_id;
use crate::snapshot::manifest::{
    manifest_file_name, ArchiveInfo, SnapshotManifest, MANIFEST_SUFFIX,
};
use crate::tree::{base_name, join, normalize, KeySet};
use chrono::Utc;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

pub struct CreateRequest<'a> {
    pub name: &'a str,
    pub items: &'a [PathBuf],
    pub compression: Compression,
    /// Staging directory; files staged here are left in place.
    pub tmp_dir: Option<&'a Path>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub id: String,
    pub archive_key: String,
    pub manifest_key: String,
}

/// Snapshots of one repository under one namespace directory.
pub struct SnapshotCommandService<'a> {
    backend: &'a dyn Backend,
    repo: &'a RepoRef,
    namespace: String,
}

impl<'a> SnapshotCommandService<'a> {
    /// `namespace` is normalized; empty means the repository root.
    pub fn new(backend: &'a dyn Backend, repo: &'a RepoRef, namespace: &str) -> Self {
        Self {
            backend,
            repo,
            namespace: normalize(namespace),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, file_name: &str) -> String {
        join(&self.namespace, file_name)
    }

    fn keys(&self) -> Result<KeySet, ApiError> {
        Ok(self.backend.list_all_keys(self.repo)?)
    }

    fn require_id(id: &str) -> Result<&str, ApiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::InvalidArgument("snapshot id is required".to_string()));
        }
        Ok(id)
    }

    /// Archive `items`, then upload the archive and its manifest.
    pub fn create(&self, request: &CreateRequest<'_>) -> Result<CreateOutcome, ApiError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidArgument(
                "snapshot create needs --name".to_string(),
            ));
        }
        if request.items.is_empty() {
            return Err(ApiError::InvalidArgument(
                "snapshot create needs files or directories to archive".to_string(),
            ));
        }

        let id = new_snapshot_id(name);
        let (_guard, staging) = match request.tmp_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                (None, dir.to_path_buf())
            }
            None => {
                let temp = TempDir::new()?;
                let path = temp.path().to_path_buf();
                (Some(temp), path)
            }
        };

        let archive_name = format!("{}.{}", id, request.compression.extension());
        let archive_path = staging.join(&archive_name);
        let size_bytes = create_archive(request.items, &archive_path, request.compression)?;

        let manifest = SnapshotManifest {
            id: id.clone(),
            name: request.name.to_string(),
            created_timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            items: request
                .items
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            archive: ArchiveInfo {
                basename: archive_name.clone(),
                size_bytes,
                compression: request.compression.as_str().to_string(),
            },
        };
        let manifest_name = manifest_file_name(&id);
        let manifest_path = staging.join(&manifest_name);
        std::fs::write(&manifest_path, manifest.to_pretty_json()?)?;

        let message = format!("snapshot: {} - {}", id, request.name);
        let archive_key = self.key(&archive_name);
        let manifest_key = self.key(&manifest_name);
        for (local, key) in [(&archive_path, &archive_key), (&manifest_path, &manifest_key)] {
            self.backend
                .upload_file(local, key, self.repo, &message)
                .map_err(|source| ApiError::UploadFailed {
                    file: local.display().to_string(),
                    source,
                })?;
            debug!(key = %key, "Uploaded snapshot file");
        }

        info!(id = %id, size_bytes, "Snapshot created");
        Ok(CreateOutcome {
            id,
            archive_key,
            manifest_key,
        })
    }

    /// Snapshot ids under the namespace, newest first.
    pub fn list(&self) -> Result<Vec<String>, ApiError> {
        let keys = self.keys()?;
        let prefix = if self.namespace.is_empty() {
            String::new()
        } else {
            format!("{}/", self.namespace)
        };
        let ids: BTreeSet<String> = keys
            .with_prefix(&prefix)
            .filter_map(|k| base_name(k).strip_suffix(MANIFEST_SUFFIX))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        Ok(ids.into_iter().rev().collect())
    }

    fn fetch_manifest_text(
        &self,
        keys: &KeySet,
        id: &str,
        cache_dir: Option<&Path>,
    ) -> Result<(String, String), ApiError> {
        let key = self.key(&manifest_file_name(id));
        if !keys.contains(&key) {
            return Err(ApiError::NotFound(key));
        }
        let cached = self.backend.download_file(self.repo, &key, cache_dir)?;
        let text = std::fs::read_to_string(&cached)?;
        Ok((key, text))
    }

    /// Raw manifest JSON for `id`.
    pub fn show(&self, id: &str) -> Result<String, ApiError> {
        let id = Self::require_id(id)?;
        let (_, text) = self.fetch_manifest_text(&self.keys()?, id, None)?;
        Ok(text)
    }

    /// Download the archive of `id` and extract it into `extract_dir`.
    pub fn get(
        &self,
        id: &str,
        extract_dir: &Path,
        cache_dir: Option<&Path>,
    ) -> Result<SnapshotManifest, ApiError> {
        let id = Self::require_id(id)?;
        let keys = self.keys()?;
        let (manifest_key, text) = self.fetch_manifest_text(&keys, id, cache_dir)?;
        let manifest = SnapshotManifest::parse(&text, &manifest_key)?;

        let archive_key = self.key(manifest.archive.basename.trim());
        if !keys.contains(&archive_key) {
            return Err(ApiError::NotFound(archive_key));
        }
        let archive = self
            .backend
            .download_file(self.repo, &archive_key, cache_dir)?;
        extract_archive(&archive, extract_dir)?;
        info!(id = %id, dest = %extract_dir.display(), "Snapshot restored");
        Ok(manifest)
    }

    /// Delete every key of `id` in one commit after confirmation.
    pub fn destroy(
        &self,
        id: &str,
        assume_yes: bool,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<Vec<String>, ApiError> {
        let id = Self::require_id(id)?;
        let prefix = format!("{}.", self.key(id));
        let targets: Vec<String> = self
            .keys()?
            .with_prefix(&prefix)
            .map(str::to_string)
            .collect();
        if targets.is_empty() {
            return Err(ApiError::NoMatch(format!("snapshot {}", id)));
        }

        let action = format!("destroy snapshot {}", id);
        require_confirmation(prompt, assume_yes, &action, &targets)?;
        let operations: Vec<Operation> = targets.iter().map(Operation::delete).collect();
        self.backend.commit(self.repo, &operations, &action)?;
        info!(id = %id, files = targets.len(), "Snapshot destroyed");
        Ok(targets)
    }
}
