//! CLI parse: clap types for hff. No behavior; definitions only.

use crate::archive::Compression;
use crate::backend::RepoKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hff - filesystem commands for Hugging Face Hub repositories
#[derive(Parser)]
#[command(name = "hff")]
#[command(about = "Directories, move, glob delete and snapshots on top of a Hugging Face Hub repository")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository id (owner/name)
    #[arg(long)]
    pub repo: String,

    /// Repository type
    #[arg(long = "type", value_enum, default_value_t = RepoKind::Model)]
    pub repo_type: RepoKind,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List a directory, or the keys matching a glob
    Ls {
        /// Directory or glob (default: repository root)
        path: Option<String>,
    },
    /// Create a directory (adds a .gitkeep marker)
    Mkdir { path: String },
    /// Move or rename a file; a source ending in '/' moves the whole directory
    Mv { src: String, dst: String },
    /// Delete a file, a directory (trailing '/') or every key matching a glob
    Rm {
        path: String,

        /// Print what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,

        /// Skip the typed DELETE confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Upload a local file (or local glob) to a key or directory
    Put {
        local: String,
        dst: String,

        /// Commit message (default: "put <dest>")
        #[arg(short = 'm', long = "message")]
        message: Option<String>,
    },
    /// Download a file
    Get {
        src: String,

        /// Output path (default: the file's base name)
        out: Option<PathBuf>,

        /// Download cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Move the cached file instead of copying it
        #[arg(long = "move")]
        move_file: bool,
    },
    /// Archive snapshots stored in the repository
    Snapshot {
        /// Snapshot directory inside the repository (default from config: "snapshot")
        #[arg(long)]
        snapdir: Option<String>,

        #[command(subcommand)]
        command: SnapshotCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SnapshotCommands {
    /// Archive files and directories and upload them as a snapshot
    Create {
        /// Human name; the id is derived from it
        #[arg(long)]
        name: String,

        /// Archive compression
        #[arg(long, value_enum, default_value_t = Compression::Gz)]
        compress: Compression,

        /// Staging directory for the archive and manifest (kept after upload)
        #[arg(long)]
        tmp_dir: Option<PathBuf>,

        /// Files and directories to archive
        items: Vec<PathBuf>,
    },
    /// List snapshot ids, newest first
    List,
    /// Print a snapshot manifest
    Show { id: String },
    /// Download and extract a snapshot
    Get {
        id: String,

        /// Extraction directory
        #[arg(long, default_value = ".")]
        extract_dir: PathBuf,

        /// Download cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Delete a snapshot
    Destroy {
        id: String,

        /// Skip the typed DELETE confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
}
