//! Emulated Directory Tree
//!
//! Derives a hierarchical view (directories, children, globs, free names) from the
//! flat key listing of a repository. Nothing here performs I/O; every function works
//! over a [`KeySet`] snapshot taken at the start of a command.

pub mod collision;
pub mod directory;
pub mod glob;
pub mod keyset;
pub mod path;

pub use collision::unique_destination;
pub use directory::{directory_exists, ensure_directory, list_children, DIR_MARKER};
pub use glob::{has_glob, match_glob, GlobPattern};
pub use keyset::KeySet;
pub use path::{base_name, join, normalize, parent_dir, PathRequest};
