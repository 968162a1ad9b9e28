//! End-to-end filesystem scenarios through the CLI route table

use super::test_utils::Harness;
use hff::error::ApiError;

#[test]
fn test_directory_lifecycle_scenario() {
    let h = Harness::new();

    assert_eq!(h.run(&["mkdir", "a/b"]).unwrap(), "ok");
    assert_eq!(h.run(&["ls", "a"]).unwrap(), "a/b/");

    let local = h.local_file("local.txt", "payload");
    assert_eq!(h.run(&["put", &local, "a/b/"]).unwrap(), "ok");
    assert_eq!(h.run(&["ls", "a/b"]).unwrap(), "a/b/local.txt");

    assert_eq!(
        h.run(&["mv", "a/b/local.txt", "a/c/"]).unwrap(),
        "a/c/local.txt"
    );
    assert_eq!(h.run(&["ls", "a/c"]).unwrap(), "a/c/local.txt");
    assert_eq!(h.run(&["ls", "a/b"]).unwrap(), "(empty)");

    let other = h.local_file("other.txt", "other");
    h.run(&["put", &other, "a/c/other.txt"]).unwrap();
    assert_eq!(
        h.run(&["mv", "a/c/other.txt", "a/c/local.txt"]).unwrap(),
        "a/c/local.txt__dup1"
    );

    let before = h.keys();
    let dry = h.run(&["rm", "a/*", "--dry-run"]).unwrap();
    assert_eq!(
        dry.lines().collect::<Vec<_>>(),
        vec![
            "a/b/.gitkeep",
            "a/c/.gitkeep",
            "a/c/local.txt",
            "a/c/local.txt__dup1"
        ]
    );
    assert_eq!(h.keys(), before);

    assert_eq!(h.run(&["rm", "a/*", "-y"]).unwrap(), "ok");
    assert_eq!(h.run(&["ls", "a"]).unwrap(), "(empty)");
    assert_eq!(h.run(&["ls"]).unwrap(), "(empty)");
}

#[test]
fn test_mkdir_twice_is_one_commit() {
    let h = Harness::new();
    assert_eq!(h.run(&["mkdir", "data"]).unwrap(), "ok");
    assert_eq!(h.run(&["mkdir", "data/"]).unwrap(), "exists");
    assert_eq!(h.keys(), vec!["data/.gitkeep"]);
    assert_eq!(h.backend.commits().len(), 1);
}

#[test]
fn test_subtree_move_is_one_commit() {
    let h = Harness::new();
    h.backend.seed(&h.repo, "src/.gitkeep", "");
    h.backend.seed(&h.repo, "src/a.txt", "a");
    h.backend.seed(&h.repo, "src/deep/b.txt", "b");
    h.backend.seed(&h.repo, "dst/.gitkeep", "");

    let out = h.run(&["mv", "src/", "dst"]).unwrap();
    assert_eq!(out, "dst/a.txt\ndst/deep/b.txt");
    assert_eq!(
        h.keys(),
        vec!["dst/.gitkeep", "dst/a.txt", "dst/deep/.gitkeep", "dst/deep/b.txt"]
    );
    assert_eq!(h.backend.commits().len(), 1);
    assert_eq!(h.backend.commits()[0].message, "mv src/ -> dst/");
    assert_eq!(h.backend.file(&h.repo, "dst/deep/b.txt").unwrap(), b"b");
}

#[test]
fn test_prefix_delete_with_wrong_confirmation_aborts() {
    let h = Harness::with_prompt("delete please");
    h.backend.seed(&h.repo, "logs/1.txt", "1");
    h.backend.seed(&h.repo, "logs/2.txt", "2");

    let err = h.run(&["rm", "logs/"]).unwrap_err();
    assert!(matches!(err, ApiError::Aborted(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(h.keys().len(), 2);

    // A single key needs no confirmation.
    assert_eq!(h.run(&["rm", "logs/1.txt"]).unwrap(), "ok");
    assert_eq!(h.keys(), vec!["logs/2.txt"]);
}

#[test]
fn test_error_exit_codes() {
    let h = Harness::new();
    h.backend.seed(&h.repo, "x.txt", "x");

    let invalid = h.run(&["mkdir", "/"]).unwrap_err();
    assert_eq!(invalid.exit_code(), 2);

    let missing = h.run(&["rm", "nope.txt"]).unwrap_err();
    assert!(matches!(missing, ApiError::NotFound(_)));
    assert_eq!(missing.exit_code(), 1);

    let no_match = h.run(&["rm", "*.bin", "-y"]).unwrap_err();
    assert!(matches!(no_match, ApiError::NoMatch(_)));

    let no_src = h.run(&["mv", "nope.txt", "y.txt"]).unwrap_err();
    assert!(matches!(no_src, ApiError::NotFound(_)));
}

#[test]
fn test_multi_file_put_needs_directory_destination() {
    let h = Harness::new();
    h.local_file("batch/a.csv", "a");
    h.local_file("batch/b.csv", "b");
    let pattern = format!("{}/local/batch/*.csv", h.temp.path().display());

    let err = h.run(&["put", &pattern, "tables"]).unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert!(h.keys().is_empty());

    assert_eq!(h.run(&["put", &pattern, "tables/", "-m", "load"]).unwrap(), "ok");
    assert_eq!(
        h.keys(),
        vec!["tables/.gitkeep", "tables/a.csv", "tables/b.csv"]
    );
    let messages: Vec<String> = h.backend.commits().into_iter().map(|c| c.message).collect();
    assert_eq!(messages, vec!["mkdir tables", "load", "load"]);
}

#[test]
fn test_get_copies_and_moves() {
    let h = Harness::new();
    h.backend.seed(&h.repo, "models/w.bin", vec![9u8; 16]);

    let out = h.temp.path().join("out/w.bin");
    let printed = h
        .run(&["get", "models/w.bin", out.to_str().unwrap()])
        .unwrap();
    assert_eq!(printed, out.display().to_string());
    assert_eq!(std::fs::read(&out).unwrap(), vec![9u8; 16]);

    let cache = h.temp.path().join("alt-cache");
    let moved = h.temp.path().join("moved.bin");
    h.run(&[
        "get",
        "models/w.bin",
        moved.to_str().unwrap(),
        "--cache-dir",
        cache.to_str().unwrap(),
        "--move",
    ])
    .unwrap();
    assert_eq!(std::fs::read(&moved).unwrap(), vec![9u8; 16]);
    assert!(!cache.join("models--org--repo/models/w.bin").exists());

    let err = h.run(&["get", "models/none.bin"]).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_move_directory_into_its_parent() {
    let h = Harness::new();
    h.backend.seed(&h.repo, "a/b/.gitkeep", "");
    h.backend.seed(&h.repo, "a/b/b/y", "inner");
    h.backend.seed(&h.repo, "a/b/y", "outer");

    assert_eq!(h.run(&["mv", "a/b/", "a"]).unwrap(), "a/b/y\na/y");
    assert_eq!(
        h.keys(),
        vec!["a/.gitkeep", "a/b/.gitkeep", "a/b/y", "a/y"]
    );
    assert_eq!(h.backend.file(&h.repo, "a/b/y").unwrap(), b"inner");
    assert_eq!(h.backend.file(&h.repo, "a/y").unwrap(), b"outer");
    assert_eq!(h.backend.commits().len(), 1);
}

#[test]
fn test_put_with_clashing_base_names_uploads_nothing() {
    let h = Harness::new();
    h.local_file("batch/x/a.txt", "x");
    h.local_file("batch/y/a.txt", "y");
    let pattern = format!("{}/local/batch/*/a.txt", h.temp.path().display());

    let err = h.run(&["put", &pattern, "tables/"]).unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(h.keys().is_empty());
    assert!(h.backend.commits().is_empty());
}
