//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::backend::{Backend, HubClient, RepoRef};
use crate::cli::output::format_warning;
use crate::cli::parse::{Cli, Commands, SnapshotCommands};
use crate::cli::presentation::{
    format_get_outcome, format_ls_entries, format_mkdir_outcome, format_mv_outcome,
    format_put_outcome, format_rm_outcome, format_snapshot_destroy, format_snapshot_list, OK,
};
use crate::cli::{command_name, is_mutating};
use crate::config::{ConfigLoader, HffConfig};
use crate::error::ApiError;
use crate::planner::{FsCommandService, GetRequest, Placement};
use crate::prompt::{ConfirmPrompt, TerminalPrompt};
use crate::snapshot::{CreateRequest, SnapshotCommandService};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: configuration, repository and collaborators.
pub struct RunContext {
    config: HffConfig,
    repo: RepoRef,
    backend: Arc<dyn Backend>,
    prompt: Box<dyn ConfirmPrompt>,
}

impl RunContext {
    /// Load configuration, validate the repository and connect the hub client.
    /// Credentials are checked here, before any request is made.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(cli.config.as_deref())?;
        let repo = RepoRef::new(cli.repo.trim(), cli.repo_type);
        repo.validate().map_err(ApiError::InvalidArgument)?;
        let backend = HubClient::new(&config)?;
        Ok(Self::with_backend(
            config,
            repo,
            Arc::new(backend),
            Box::new(TerminalPrompt),
        ))
    }

    /// Context over an explicit backend and prompt.
    pub fn with_backend(
        config: HffConfig,
        repo: RepoRef,
        backend: Arc<dyn Backend>,
        prompt: Box<dyn ConfirmPrompt>,
    ) -> Self {
        Self {
            config,
            repo,
            backend,
            prompt,
        }
    }

    pub fn config(&self) -> &HffConfig {
        &self.config
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Execute a CLI command via the single route table. Returns stdout text.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        let started = Instant::now();
        debug!(
            command = %name,
            repo = %self.repo,
            mutating = is_mutating(command),
            "Running command"
        );

        let result = self.execute_inner(command);
        match &result {
            Ok(_) => info!(
                command = %name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Command completed"
            ),
            Err(e) => warn!(command = %name, error = %e, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        let fs = FsCommandService::new(self.backend.as_ref(), &self.repo);
        match command {
            Commands::Ls { path } => {
                let entries = fs.ls(path.as_deref().unwrap_or(""))?;
                Ok(format_ls_entries(&entries))
            }
            Commands::Mkdir { path } => Ok(format_mkdir_outcome(fs.mkdir(path)?)),
            Commands::Mv { src, dst } => Ok(format_mv_outcome(&fs.mv(src, dst)?)),
            Commands::Rm { path, dry_run, yes } => {
                let outcome = fs.rm(path, *dry_run, *yes, self.prompt.as_ref())?;
                Ok(format_rm_outcome(&outcome))
            }
            Commands::Put {
                local,
                dst,
                message,
            } => {
                let outcome = fs.put(local, dst, message.as_deref())?;
                Ok(format_put_outcome(&outcome))
            }
            Commands::Get {
                src,
                out,
                cache_dir,
                move_file,
            } => {
                let outcome = fs.get(&GetRequest {
                    src,
                    out: out.as_deref(),
                    cache_dir: cache_dir.as_deref(),
                    move_file: *move_file,
                })?;
                if let Placement::CopiedCleanupFailed { leftover, reason } = &outcome.placement {
                    eprintln!(
                        "{}",
                        format_warning(&format!(
                            "copied, but could not remove cached file {}: {}",
                            leftover.display(),
                            reason
                        ))
                    );
                }
                Ok(format_get_outcome(&outcome))
            }
            Commands::Snapshot { snapdir, command } => {
                let namespace = snapdir
                    .as_deref()
                    .unwrap_or(&self.config.snapshot.namespace);
                self.execute_snapshot(namespace, command)
            }
        }
    }

    fn execute_snapshot(
        &self,
        namespace: &str,
        command: &SnapshotCommands,
    ) -> Result<String, ApiError> {
        let snapshots = SnapshotCommandService::new(self.backend.as_ref(), &self.repo, namespace);
        match command {
            SnapshotCommands::Create {
                name,
                compress,
                tmp_dir,
                items,
            } => {
                let outcome = snapshots.create(&CreateRequest {
                    name,
                    items,
                    compression: *compress,
                    tmp_dir: tmp_dir.as_deref(),
                })?;
                Ok(outcome.id)
            }
            SnapshotCommands::List => Ok(format_snapshot_list(&snapshots.list()?)),
            SnapshotCommands::Show { id } => Ok(snapshots.show(id)?.trim_end().to_string()),
            SnapshotCommands::Get {
                id,
                extract_dir,
                cache_dir,
            } => {
                snapshots.get(id, extract_dir, cache_dir.as_deref())?;
                Ok(OK.to_string())
            }
            SnapshotCommands::Destroy { id, yes } => {
                let removed = snapshots.destroy(id, *yes, self.prompt.as_ref())?;
                Ok(format_snapshot_destroy(&removed))
            }
        }
    }
}
