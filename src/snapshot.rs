//! Snapshot Manager
//!
//! A snapshot is an archive plus a JSON manifest stored side by side under a
//! namespace directory (`<ns>/<id>.tar[.gz]`, `<ns>/<id>.manifest.json`).
//! Snapshots are immutable: created once, restored by id, destroyed by id.

mod commands;
pub mod id;
pub mod manifest;

pub use commands::{CreateOutcome, CreateRequest, SnapshotCommandService};
pub use id::{new_snapshot_id, slugify, snapshot_id_at};
pub use manifest::{ArchiveInfo, SnapshotManifest, MANIFEST_SUFFIX};
