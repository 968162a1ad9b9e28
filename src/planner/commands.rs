//! Filesystem command service: one method per filesystem command.
//!
//! Each method lists the repository, plans against that KeySet and submits the
//! plan. The CLI parses, calls one method per variant and formats the outcome.

use crate::backend::{Backend, RepoRef};
use crate::error::ApiError;
use crate::planner::local::{expand_local, place_file, Placement};
use crate::planner::plan::{
    list_entries, plan_delete, plan_mkdir, plan_move, plan_put, DeletePlan, MovePlan,
};
use crate::prompt::{require_confirmation, ConfirmPrompt};
use crate::tree::{base_name, KeySet, PathRequest};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MkdirOutcome {
    Created,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RmOutcome {
    /// Targets that would be deleted; nothing was committed.
    DryRun(Vec<String>),
    Deleted(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MvOutcome {
    /// Final destination of every moved file.
    pub destinations: Vec<String>,
    pub revision: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    pub directory_created: bool,
    pub uploaded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOutcome {
    pub output: PathBuf,
    pub placement: Placement,
}

#[derive(Debug, Clone, Default)]
pub struct GetRequest<'a> {
    pub src: &'a str,
    pub out: Option<&'a Path>,
    pub cache_dir: Option<&'a Path>,
    pub move_file: bool,
}

/// Filesystem commands against one repository.
pub struct FsCommandService<'a> {
    backend: &'a dyn Backend,
    repo: &'a RepoRef,
}

impl<'a> FsCommandService<'a> {
    pub fn new(backend: &'a dyn Backend, repo: &'a RepoRef) -> Self {
        Self { backend, repo }
    }

    fn keys(&self) -> Result<KeySet, ApiError> {
        Ok(self.backend.list_all_keys(self.repo)?)
    }

    pub fn ls(&self, path: &str) -> Result<Vec<String>, ApiError> {
        list_entries(&self.keys()?, path)
    }

    pub fn mkdir(&self, path: &str) -> Result<MkdirOutcome, ApiError> {
        let plan = plan_mkdir(&self.keys()?, path)?;
        if plan.operations.is_empty() {
            debug!(dir = %plan.dir, "Directory marker already present");
            return Ok(MkdirOutcome::Exists);
        }
        self.backend
            .commit(self.repo, &plan.operations, &plan.message())?;
        info!(dir = %plan.dir, "Directory created");
        Ok(MkdirOutcome::Created)
    }

    pub fn rm(
        &self,
        path: &str,
        dry_run: bool,
        assume_yes: bool,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<RmOutcome, ApiError> {
        let plan: DeletePlan = plan_delete(&self.keys()?, path)?;
        if dry_run {
            return Ok(RmOutcome::DryRun(plan.targets));
        }
        if plan.needs_confirmation() {
            require_confirmation(prompt, assume_yes, &plan.message, &plan.targets)?;
        }
        self.backend
            .commit(self.repo, &plan.operations(), &plan.message)?;
        info!(count = plan.targets.len(), "Deleted");
        Ok(RmOutcome::Deleted(plan.targets))
    }

    pub fn mv(&self, src: &str, dst: &str) -> Result<MvOutcome, ApiError> {
        let plan: MovePlan = plan_move(&self.keys()?, src, dst)?;
        let revision = self
            .backend
            .commit(self.repo, &plan.operations, &plan.message)?;
        info!(files = plan.moves.len(), revision = %revision, "Moved");
        Ok(MvOutcome {
            destinations: plan.moves.into_iter().map(|(_, to)| to).collect(),
            revision,
        })
    }

    /// Upload one local file or a local glob. The first failing upload stops
    /// the rest; uploads before it stay committed.
    pub fn put(
        &self,
        local: &str,
        dst: &str,
        message: Option<&str>,
    ) -> Result<PutOutcome, ApiError> {
        let files = expand_local(local)?;
        let plan = plan_put(&self.keys()?, &files, dst)?;

        let directory_created = !plan.mkdir.is_empty();
        if directory_created {
            self.backend
                .commit(self.repo, &plan.mkdir, &format!("mkdir {}", plan.dir))?;
        }

        let mut uploaded = Vec::with_capacity(plan.uploads.len());
        for upload in plan.uploads {
            let default_message = format!("put {}", upload.dest);
            let message = message.unwrap_or(&default_message);
            self.backend
                .upload_file(&upload.local, &upload.dest, self.repo, message)
                .map_err(|source| ApiError::UploadFailed {
                    file: upload.local.display().to_string(),
                    source,
                })?;
            debug!(local = %upload.local.display(), dest = %upload.dest, "Uploaded");
            uploaded.push(upload.dest);
        }
        Ok(PutOutcome {
            directory_created,
            uploaded,
        })
    }

    /// Download `src` to the output path (default: its base name).
    pub fn get(&self, request: &GetRequest<'_>) -> Result<GetOutcome, ApiError> {
        let src = PathRequest::parse(request.src);
        if src.is_empty() {
            return Err(ApiError::InvalidArgument(
                "get needs a non-empty source".to_string(),
            ));
        }
        let output = request
            .out
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(base_name(&src.key)));

        let cached = self
            .backend
            .download_file(self.repo, &src.key, request.cache_dir)?;
        let placement = place_file(&cached, &output, request.move_file)?;
        Ok(GetOutcome { output, placement })
    }
}
