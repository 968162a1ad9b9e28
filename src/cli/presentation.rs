//! CLI presentation: text formatters per command family.

mod fs;
mod snapshot;

pub use fs::{
    format_get_outcome, format_ls_entries, format_mkdir_outcome, format_mv_outcome,
    format_put_outcome, format_rm_outcome,
};
pub use snapshot::{format_snapshot_destroy, format_snapshot_list};

/// Sentinel printed when a listing has no entries.
pub const EMPTY_LISTING: &str = "(empty)";

/// Output of a command that only confirms success.
pub const OK: &str = "ok";
