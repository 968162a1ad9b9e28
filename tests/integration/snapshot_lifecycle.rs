//! Snapshot create / list / show / get / destroy against the in-memory backend

use super::test_utils::Harness;
use hff::error::ApiError;
use hff::snapshot::SnapshotManifest;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Where an archived absolute path lands inside an extraction directory.
fn extracted(root: &Path, item: &str) -> PathBuf {
    root.join(item.trim_start_matches('/'))
}

#[test]
fn test_snapshot_round_trip() {
    let h = Harness::new();
    let file = h.local_file("set/weights.bin", "binary-ish \u{0}\u{1} content");
    let notes = h.local_file("set/notes/readme.md", "# notes");
    let set_dir = h.temp.path().join("local/set");

    let id = h
        .run(&[
            "snapshot",
            "create",
            "--name",
            "My Set!",
            "--compress",
            "gz",
            set_dir.to_str().unwrap(),
        ])
        .unwrap();
    assert!(Regex::new(r"^\d{8}_\d{6}__My_Set_$").unwrap().is_match(&id));
    assert_eq!(
        h.keys(),
        vec![
            format!("snapshot/{}.manifest.json", id),
            format!("snapshot/{}.tar.gz", id),
        ]
    );

    assert_eq!(h.run(&["snapshot", "list"]).unwrap(), id);

    let shown = h.run(&["snapshot", "show", &id]).unwrap();
    let manifest = SnapshotManifest::parse(&shown, "shown").unwrap();
    assert_eq!(manifest.id, id);
    assert_eq!(manifest.name, "My Set!");
    assert_eq!(manifest.archive.basename, format!("{}.tar.gz", id));
    assert!(manifest.created_timestamp.ends_with('Z'));

    let restore = h.temp.path().join("restore");
    assert_eq!(
        h.run(&[
            "snapshot",
            "get",
            &id,
            "--extract-dir",
            restore.to_str().unwrap()
        ])
        .unwrap(),
        "ok"
    );
    assert_eq!(
        std::fs::read(extracted(&restore, &file)).unwrap(),
        std::fs::read(&file).unwrap()
    );
    assert_eq!(
        std::fs::read_to_string(extracted(&restore, &notes)).unwrap(),
        "# notes"
    );

    assert_eq!(h.run(&["snapshot", "destroy", &id, "-y"]).unwrap(), "ok");
    assert!(h.keys().is_empty());
    assert_eq!(h.run(&["snapshot", "list"]).unwrap(), "");
}

#[test]
fn test_custom_snapdir_and_uncompressed_archive() {
    let h = Harness::new();
    let file = h.local_file("plain.txt", "plain");

    let id = h
        .run(&[
            "snapshot",
            "--snapdir",
            "/backups/",
            "create",
            "--name",
            "plain",
            "--compress",
            "none",
            &file,
        ])
        .unwrap();
    assert!(h.keys().contains(&format!("backups/{}.tar", id)));
    assert_eq!(h.run(&["snapshot", "list"]).unwrap(), "");
    assert_eq!(
        h.run(&["snapshot", "--snapdir", "backups", "list"]).unwrap(),
        id
    );

    let restore = h.temp.path().join("restore");
    h.run(&[
        "snapshot",
        "--snapdir",
        "backups",
        "get",
        &id,
        "--extract-dir",
        restore.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(
        std::fs::read_to_string(extracted(&restore, &file)).unwrap(),
        "plain"
    );
}

#[test]
fn test_destroy_with_wrong_confirmation_deletes_nothing() {
    let h = Harness::with_prompt("yes");
    let file = h.local_file("a.txt", "a");
    let id = h
        .run(&["snapshot", "create", "--name", "keep me", &file])
        .unwrap();
    assert!(h.keys().contains(&format!("snapshot/{}.tar.gz", id)));
    let before = h.keys();

    let err = h.run(&["snapshot", "destroy", &id]).unwrap_err();
    assert!(matches!(err, ApiError::Aborted(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(h.keys(), before);
}

#[test]
fn test_missing_and_corrupt_snapshots() {
    let h = Harness::new();
    h.backend
        .seed(&h.repo, "snapshot/broken.manifest.json", "{\"id\": ");

    let missing = h.run(&["snapshot", "show", "nope"]).unwrap_err();
    assert!(matches!(missing, ApiError::NotFound(_)));

    let corrupt = h.run(&["snapshot", "get", "broken"]).unwrap_err();
    assert!(matches!(corrupt, ApiError::CorruptManifest(_)));

    let nothing = h.run(&["snapshot", "destroy", "nope", "-y"]).unwrap_err();
    assert!(matches!(nothing, ApiError::NoMatch(_)));
}
