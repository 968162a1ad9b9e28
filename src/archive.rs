//! Tar codec for snapshots: plain `.tar` or gzip-compressed `.tar.gz`.

use crate::error::ApiError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Archive compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Gz,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gz => "gz",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => "tar",
            Compression::Gz => "tar.gz",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn archive_error(context: &str, path: &Path, err: impl fmt::Display) -> ApiError {
    ApiError::ArchiveError(format!("{} {}: {}", context, path.display(), err))
}

/// Name an item gets inside the archive: its path without root, `.` or `..`.
fn entry_name(item: &Path) -> PathBuf {
    item.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Archive `items` (files or directories) into `dest`. Returns the archive size.
pub fn create_archive(
    items: &[PathBuf],
    dest: &Path,
    compression: Compression,
) -> Result<u64, ApiError> {
    for item in items {
        if !item.exists() {
            return Err(archive_error("cannot archive", item, "no such file or directory"));
        }
    }
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(dest).map_err(|e| archive_error("cannot create", dest, e))?;
    let writer = BufWriter::new(file);
    match compression {
        Compression::None => {
            let mut builder = tar::Builder::new(writer);
            append_items(&mut builder, items)?;
            builder
                .into_inner()
                .and_then(|mut w| w.flush())
                .map_err(|e| archive_error("cannot finish", dest, e))?;
        }
        Compression::Gz => {
            let gz = GzEncoder::new(writer, flate2::Compression::default());
            let mut builder = tar::Builder::new(gz);
            append_items(&mut builder, items)?;
            builder
                .into_inner()
                .and_then(|gz| gz.finish())
                .and_then(|mut w| w.flush())
                .map_err(|e| archive_error("cannot finish", dest, e))?;
        }
    }

    let size = std::fs::metadata(dest)?.len();
    debug!(archive = %dest.display(), items = items.len(), size, "Archive created");
    Ok(size)
}

fn append_items<W: Write>(builder: &mut tar::Builder<W>, items: &[PathBuf]) -> Result<(), ApiError> {
    for item in items {
        let name = entry_name(item);
        let result = if item.is_dir() {
            let name = if name.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                name
            };
            builder.append_dir_all(&name, item)
        } else {
            builder.append_path_with_name(item, &name)
        };
        result.map_err(|e| archive_error("cannot archive", item, e))?;
    }
    Ok(())
}

/// Extract `archive` into `dest_dir`, choosing the codec from the file name.
pub fn extract_archive(archive: &Path, dest_dir: &Path) -> Result<(), ApiError> {
    std::fs::create_dir_all(dest_dir)?;
    let file = File::open(archive).map_err(|e| archive_error("cannot open", archive, e))?;
    let reader = BufReader::new(file);

    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let result = if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        tar::Archive::new(GzDecoder::new(reader)).unpack(dest_dir)
    } else {
        tar::Archive::new(reader).unpack(dest_dir)
    };
    result.map_err(|e| archive_error("cannot extract", archive, e))?;
    debug!(archive = %archive.display(), dest = %dest_dir.display(), "Archive extracted");
    Ok(())
}
