//! hff: Filesystem Semantics over Flat Hub Repositories
//!
//! A Hugging Face Hub repository is a flat, versioned list of file paths with
//! atomic multi-file commits. hff emulates directories, move, recursive and
//! glob delete, and archive snapshots on top of that, planning every mutating
//! command as a single commit.

pub mod archive;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod planner;
pub mod prompt;
pub mod snapshot;
pub mod tree;
