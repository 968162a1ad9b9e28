//! Configuration System
//!
//! Layered configuration for the hub endpoint, credentials, transfer behavior,
//! snapshot namespace and logging. Built once at process start and threaded
//! through the command services as plain structs.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;

mod merge {
    pub mod merge_policy;
}

mod sources {
    pub mod environment;
    pub mod global_file;
}

pub use facade::ConfigLoader;
pub use merge::merge_policy::{DEFAULT_ENDPOINT, DEFAULT_REVISION, DEFAULT_SNAPSHOT_NAMESPACE};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HffConfig {
    /// Hub endpoint and credentials
    #[serde(default)]
    pub hub: HubConfig,

    /// Transfer behavior (acceleration, download cache)
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Snapshot defaults
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hub endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Access token (normally from HF_TOKEN)
    #[serde(default)]
    pub token: Option<String>,

    /// Branch every command reads from and commits to
    #[serde(default = "default_revision")]
    pub revision: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_revision() -> String {
    DEFAULT_REVISION.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    600
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            revision: default_revision(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HubConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Accelerated transfers: multipart LFS uploads and streamed downloads.
    /// On unless HF_HUB_ENABLE_HF_TRANSFER says otherwise.
    #[serde(default = "default_true")]
    pub accelerated: bool,

    /// Download cache root (defaults to the platform cache directory)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            accelerated: true,
            cache_dir: None,
        }
    }
}

impl TransferConfig {
    /// Cache root: configured dir, else the platform cache dir, else a temp dir.
    pub fn resolve_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "hff")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("hff-cache"))
    }
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Remote directory holding `<id>.manifest.json` / `<id>.tar[.gz]` pairs
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    DEFAULT_SNAPSHOT_NAMESPACE.to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl HffConfig {
    /// Validate everything a networked command needs. Runs before any request.
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.hub.token.as_deref() {
            Some(token) if !token.trim().is_empty() => {}
            _ => return Err(ApiError::ConfigError("HF_TOKEN is not set".to_string())),
        }
        reqwest::Url::parse(&self.hub.endpoint).map_err(|e| {
            ApiError::ConfigError(format!("Invalid hub endpoint {}: {}", self.hub.endpoint, e))
        })?;
        if self.hub.revision.trim().is_empty() {
            return Err(ApiError::ConfigError("hub.revision cannot be empty".to_string()));
        }
        Ok(())
    }
}
