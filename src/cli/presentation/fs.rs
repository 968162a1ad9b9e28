//! Filesystem command formatters: one line per entry, or a status word.

use crate::cli::presentation::{EMPTY_LISTING, OK};
use crate::planner::{GetOutcome, MkdirOutcome, MvOutcome, PutOutcome, RmOutcome};

pub fn format_ls_entries(entries: &[String]) -> String {
    if entries.is_empty() {
        EMPTY_LISTING.to_string()
    } else {
        entries.join("\n")
    }
}

pub fn format_mkdir_outcome(outcome: MkdirOutcome) -> String {
    match outcome {
        MkdirOutcome::Created => OK.to_string(),
        MkdirOutcome::Exists => "exists".to_string(),
    }
}

pub fn format_rm_outcome(outcome: &RmOutcome) -> String {
    match outcome {
        RmOutcome::DryRun(targets) => targets.join("\n"),
        RmOutcome::Deleted(_) => OK.to_string(),
    }
}

pub fn format_mv_outcome(outcome: &MvOutcome) -> String {
    outcome.destinations.join("\n")
}

pub fn format_put_outcome(_outcome: &PutOutcome) -> String {
    OK.to_string()
}

pub fn format_get_outcome(outcome: &GetOutcome) -> String {
    outcome.output.display().to_string()
}
