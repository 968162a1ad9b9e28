//! Command-name contract for logging and routing.

use crate::cli::parse::{Commands, SnapshotCommands};

/// Dotted command name (e.g. "rm", "snapshot.create").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Ls { .. } => "ls".to_string(),
        Commands::Mkdir { .. } => "mkdir".to_string(),
        Commands::Mv { .. } => "mv".to_string(),
        Commands::Rm { .. } => "rm".to_string(),
        Commands::Put { .. } => "put".to_string(),
        Commands::Get { .. } => "get".to_string(),
        Commands::Snapshot { command, .. } => {
            format!("snapshot.{}", snapshot_command_name(command))
        }
    }
}

pub fn snapshot_command_name(command: &SnapshotCommands) -> &'static str {
    match command {
        SnapshotCommands::Create { .. } => "create",
        SnapshotCommands::List => "list",
        SnapshotCommands::Show { .. } => "show",
        SnapshotCommands::Get { .. } => "get",
        SnapshotCommands::Destroy { .. } => "destroy",
    }
}

/// True for commands that change the repository.
pub fn is_mutating(command: &Commands) -> bool {
    match command {
        Commands::Ls { .. } | Commands::Get { .. } => false,
        Commands::Rm { dry_run, .. } => !dry_run,
        Commands::Mkdir { .. } | Commands::Mv { .. } | Commands::Put { .. } => true,
        Commands::Snapshot { command, .. } => matches!(
            command,
            SnapshotCommands::Create { .. } | SnapshotCommands::Destroy { .. }
        ),
    }
}
