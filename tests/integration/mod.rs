//! Integration tests for the hff repository filesystem

mod cli_parse;
mod fs_scenarios;
mod snapshot_lifecycle;
mod test_utils;
