//! Snapshot manifest: the JSON record stored next to each archive.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub const MANIFEST_SUFFIX: &str = ".manifest.json";

/// Where the archive of a snapshot lives and what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    /// File name of the archive, a sibling of the manifest.
    #[serde(default)]
    pub basename: String,
    #[serde(default, alias = "bytes")]
    pub size_bytes: u64,
    /// Informational; extraction goes by the basename suffix.
    #[serde(default, alias = "compress")]
    pub compression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// UTC, `YYYY-MM-DDTHH:MM:SSZ`
    #[serde(default, alias = "created_utc")]
    pub created_timestamp: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(alias = "tar")]
    pub archive: ArchiveInfo,
}

impl SnapshotManifest {
    /// Parse manifest text read from `key`. Only the archive basename is required.
    pub fn parse(text: &str, key: &str) -> Result<Self, ApiError> {
        let manifest: SnapshotManifest = serde_json::from_str(text)
            .map_err(|e| ApiError::CorruptManifest(format!("{}: {}", key, e)))?;
        if manifest.archive.basename.trim().is_empty() {
            return Err(ApiError::CorruptManifest(format!(
                "{}: archive.basename is missing",
                key
            )));
        }
        Ok(manifest)
    }

    pub fn to_pretty_json(&self) -> Result<String, ApiError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ApiError::CorruptManifest(format!("{}: {}", self.id, e)))
    }
}

/// Manifest file name for `id`.
pub fn manifest_file_name(id: &str) -> String {
    format!("{}{}", id, MANIFEST_SUFFIX)
}
