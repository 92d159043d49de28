//! Manual removal of buckets and entries

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::catalog::{ArchiveEntry, Bucket};
use super::is_inside;
use super::restore::Confirmation;
use crate::error::{SaveKeeperError, SaveKeeperResult};

/// Delete a whole day bucket with everything in it
pub fn delete_bucket(bucket: &Bucket, _confirmation: Confirmation) -> SaveKeeperResult<PathBuf> {
    match fs::remove_dir_all(&bucket.path) {
        Ok(()) => {
            info!(path = %bucket.path.display(), "Deleted backup folder");
            Ok(bucket.path.clone())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(SaveKeeperError::bucket_not_found(bucket.label()))
        }
        Err(e) => Err(SaveKeeperError::Io(format!(
            "Failed to delete backup folder {}: {}",
            bucket.path.display(),
            e
        ))),
    }
}

/// Delete one entry, removing its bucket if that leaves it empty
///
/// Only files below `archive_root` are touched, and only a directory directly
/// below the root is pruned. The root itself is never removed.
pub fn delete_entry(
    archive_root: &Path,
    entry: &ArchiveEntry,
    _confirmation: Confirmation,
) -> SaveKeeperResult<()> {
    if !is_inside(archive_root, &entry.path) {
        return Err(SaveKeeperError::entry_not_found(format!(
            "{} in {}",
            entry.path.display(),
            archive_root.display()
        )));
    }

    match fs::remove_file(&entry.path) {
        Ok(()) => info!(path = %entry.path.display(), "Deleted backup file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SaveKeeperError::entry_not_found(entry.path.display().to_string()))
        }
        Err(e) => {
            return Err(SaveKeeperError::Io(format!(
                "Failed to delete backup file {}: {}",
                entry.path.display(),
                e
            )))
        }
    }

    if let Some(bucket_dir) = entry.path.parent() {
        let root = archive_root.canonicalize()?;
        let is_bucket = bucket_dir
            .canonicalize()
            .map(|dir| dir.parent() == Some(root.as_path()))
            .unwrap_or(false);
        let is_empty = fs::read_dir(bucket_dir)
            .map(|mut children| children.next().is_none())
            .unwrap_or(false);
        if is_bucket && is_empty {
            match fs::remove_dir(bucket_dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
