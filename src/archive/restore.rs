//! Restore selection and copy-back
//!
//! Restoring overwrites the live save file and cannot be undone, so
//! [`restore`] only runs with a [`Confirmation`] obtained by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::catalog::{ArchiveEntry, Bucket};
use super::codec::ArchiveName;
use super::copy_with_metadata;
use crate::error::{SaveKeeperError, SaveKeeperResult};

/// Proof that the user agreed to a destructive action
///
/// The engine never prompts; the presentation layer asks and then hands one
/// of these over.
#[derive(Debug)]
pub struct Confirmation {
    _private: (),
}

impl Confirmation {
    /// Record that the caller obtained explicit confirmation
    pub fn confirmed() -> Self {
        Self { _private: () }
    }
}

/// Restore candidates within one bucket
#[derive(Debug, Clone, Copy)]
pub struct RestoreCandidates<'a> {
    /// Entry with the greatest capture time
    pub latest: &'a ArchiveEntry,
    /// Entry with the second-greatest capture time
    pub previous: Option<&'a ArchiveEntry>,
}

/// Pick the latest and previous entries of a single bucket
///
/// Returns `None` for a bucket without entries. Other buckets are never
/// consulted.
pub fn select_for_bucket(bucket: &Bucket) -> Option<RestoreCandidates<'_>> {
    let mut ordered: Vec<&ArchiveEntry> = bucket.entries.iter().collect();
    ordered.sort_by_key(|e| e.captured_at);

    let latest = ordered.pop()?;
    Some(RestoreCandidates {
        latest,
        previous: ordered.pop(),
    })
}

/// Identity selection for an entry picked directly
pub fn select_exact(entry: &ArchiveEntry) -> &ArchiveEntry {
    entry
}

/// Result of a successful restore
#[derive(Debug, Clone, Serialize)]
pub struct RestoreResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes_copied: u64,
}

/// Copy an archived entry back to `destination_dir/{original_name}`
///
/// The original name is decoded from the archived file's own name. An
/// existing file at the destination is overwritten. If the entry was evicted
/// since it was listed, this fails with a not-found error.
pub fn restore(
    entry: &ArchiveEntry,
    destination_dir: &Path,
    _confirmation: Confirmation,
) -> SaveKeeperResult<RestoreResult> {
    let file_name = entry.file_name();
    let name = ArchiveName::decode(&file_name)?;

    if !entry.path.is_file() {
        return Err(SaveKeeperError::entry_not_found(entry.path.display().to_string()));
    }

    fs::create_dir_all(destination_dir).map_err(|e| {
        SaveKeeperError::Io(format!(
            "Failed to create restore directory {}: {}",
            destination_dir.display(),
            e
        ))
    })?;

    let destination = destination_dir.join(&name.original_name);
    let bytes_copied = copy_with_metadata(&entry.path, &destination).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound && !entry.path.exists() {
            SaveKeeperError::entry_not_found(entry.path.display().to_string())
        } else {
            SaveKeeperError::Io(format!("Failed to restore {}: {}", file_name, e))
        }
    })?;

    info!(source = %entry.path.display(), dest = %destination.display(), "Backup restored");

    Ok(RestoreResult {
        source: entry.path.clone(),
        destination,
        bytes_copied,
    })
}
