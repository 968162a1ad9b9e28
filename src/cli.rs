//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, is_mutating, snapshot_command_name};
pub use output::{format_warning, map_error, STDERR_TAG};
pub use parse::{Cli, Commands, SnapshotCommands};
pub use presentation::{
    format_get_outcome, format_ls_entries, format_mkdir_outcome, format_mv_outcome,
    format_put_outcome, format_rm_outcome, format_snapshot_destroy, format_snapshot_list,
    EMPTY_LISTING,
};
pub use route::RunContext;
