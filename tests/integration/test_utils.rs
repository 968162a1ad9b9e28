//! Shared test utilities for integration tests
//!
//! Builds a run context over the in-memory backend so CLI commands can be
//! exercised end to end without a hub.

use clap::Parser;
use hff::backend::{Backend, MemoryBackend, RepoKind, RepoRef};
use hff::cli::{Cli, RunContext};
use hff::config::HffConfig;
use hff::error::ApiError;
use hff::prompt::ConfirmPrompt;
use std::sync::Arc;
use tempfile::TempDir;

pub const REPO: &str = "org/repo";

/// Prompt that answers with a fixed string.
pub struct Typed(pub &'static str);

impl ConfirmPrompt for Typed {
    fn confirm_delete(&self, _action: &str, _targets: &[String]) -> Result<bool, ApiError> {
        Ok(self.0 == "DELETE")
    }
}

/// An in-memory repository plus a run context wired to it.
pub struct Harness {
    pub temp: TempDir,
    pub backend: Arc<MemoryBackend>,
    pub repo: RepoRef,
    context: RunContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_prompt("DELETE")
    }

    /// Harness whose confirmation prompt answers `answer`.
    pub fn with_prompt(answer: &'static str) -> Self {
        let temp = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new(temp.path().join("cache")));
        let repo = RepoRef::new(REPO, RepoKind::Model);
        let shared: Arc<dyn Backend> = backend.clone();
        let context = RunContext::with_backend(
            HffConfig::default(),
            repo.clone(),
            shared,
            Box::new(Typed(answer)),
        );
        Self {
            temp,
            backend,
            repo,
            context,
        }
    }

    /// Parse `args` as the words after `hff --repo org/repo` and run them.
    pub fn run(&self, args: &[&str]) -> Result<String, ApiError> {
        let argv = ["hff", "--repo", REPO]
            .into_iter()
            .chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        self.context.execute(&cli.command)
    }

    /// Write a local file under the temp dir and return its path as a string.
    pub fn local_file(&self, rel: &str, content: &str) -> String {
        let path = self.temp.path().join("local").join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.backend.keys(&self.repo)
    }
}
