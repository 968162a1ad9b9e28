//! Snapshot command formatters.

use crate::cli::presentation::OK;

/// One id per line; no snapshots prints nothing.
pub fn format_snapshot_list(ids: &[String]) -> String {
    ids.join("\n")
}

pub fn format_snapshot_destroy(_removed: &[String]) -> String {
    OK.to_string()
}
