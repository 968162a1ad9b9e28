//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Prefix of every line hff writes to stderr on its own behalf.
pub const STDERR_TAG: &str = "[hff]";

/// Map domain/service errors to the single stderr line the CLI prints.
pub fn map_error(e: &ApiError) -> String {
    format!("{} ERROR: {}", STDERR_TAG, e)
}

pub fn format_warning(message: &str) -> String {
    format!("{} WARNING: {}", STDERR_TAG, message)
}
