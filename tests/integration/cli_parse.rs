//! CLI surface: argument parsing and defaults

use clap::Parser;
use hff::archive::Compression;
use hff::backend::RepoKind;
use hff::cli::{Cli, Commands, SnapshotCommands};

#[test]
fn test_repo_is_required_and_type_defaults_to_model() {
    assert!(Cli::try_parse_from(["hff", "ls"]).is_err());

    let cli = Cli::try_parse_from(["hff", "--repo", "a/b", "ls"]).unwrap();
    assert_eq!(cli.repo_type, RepoKind::Model);
    assert!(matches!(cli.command, Commands::Ls { path: None }));

    let cli = Cli::try_parse_from(["hff", "--repo", "a/b", "--type", "dataset", "ls", "x/"]).unwrap();
    assert_eq!(cli.repo_type, RepoKind::Dataset);

    assert!(Cli::try_parse_from(["hff", "--repo", "a/b", "--type", "space", "ls"]).is_err());
}

#[test]
fn test_rm_and_get_flags() {
    let cli = Cli::try_parse_from(["hff", "--repo", "a/b", "rm", "d/", "--dry-run", "-y"]).unwrap();
    match cli.command {
        Commands::Rm { path, dry_run, yes } => {
            assert_eq!(path, "d/");
            assert!(dry_run);
            assert!(yes);
        }
        _ => panic!("expected rm"),
    }

    let cli = Cli::try_parse_from([
        "hff", "--repo", "a/b", "get", "w.bin", "out.bin", "--cache-dir", "/tmp/c", "--move",
    ])
    .unwrap();
    match cli.command {
        Commands::Get {
            src,
            out,
            cache_dir,
            move_file,
        } => {
            assert_eq!(src, "w.bin");
            assert_eq!(out.unwrap().to_str(), Some("out.bin"));
            assert_eq!(cache_dir.unwrap().to_str(), Some("/tmp/c"));
            assert!(move_file);
        }
        _ => panic!("expected get"),
    }
}

#[test]
fn test_snapshot_create_arguments() {
    let cli = Cli::try_parse_from([
        "hff", "--repo", "a/b", "snapshot", "--snapdir", "snaps", "create", "--name", "n",
        "--compress", "gz", "--tmp-dir", "/tmp/stage", "x", "y",
    ])
    .unwrap();
    match cli.command {
        Commands::Snapshot {
            snapdir,
            command:
                SnapshotCommands::Create {
                    name,
                    compress,
                    tmp_dir,
                    items,
                },
        } => {
            assert_eq!(snapdir.as_deref(), Some("snaps"));
            assert_eq!(name, "n");
            assert_eq!(compress, Compression::Gz);
            assert!(tmp_dir.is_some());
            assert_eq!(items.len(), 2);
        }
        _ => panic!("expected snapshot create"),
    }

    let cli = Cli::try_parse_from(["hff", "--repo", "a/b", "snapshot", "create", "--name", "n"]).unwrap();
    match cli.command {
        Commands::Snapshot {
            command: SnapshotCommands::Create { compress, .. },
            ..
        } => assert_eq!(compress, Compression::Gz),
        _ => panic!("expected snapshot create"),
    }
}

#[test]
fn test_verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["hff", "--repo", "a/b", "--verbose", "--quiet", "ls"]).is_err());
}
