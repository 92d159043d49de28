//! Retention enforcement
//!
//! Keeps the whole archive under a byte budget by evicting the oldest copies
//! first, across all day buckets, then removes bucket directories left empty.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::codec::ArchiveName;
use crate::error::{FailureKind, FileFailure};

/// Outcome of one enforcement pass
#[derive(Debug, Default, Serialize)]
pub struct EnforcementReport {
    /// Archive size before eviction
    pub initial_bytes: u64,
    /// Archive size after eviction, counting files that failed to delete
    pub final_bytes: u64,
    /// Files removed to get under budget, oldest first
    pub evicted: Vec<PathBuf>,
    /// Empty directories removed after eviction
    pub pruned_dirs: Vec<PathBuf>,
    /// Files sized and ordered by modification time because their name didn't
    /// decode; they stay evictable and do not make the report unclean
    pub undecodable: Vec<FileFailure>,
    /// Removals that failed; their bytes are still counted in `final_bytes`
    pub failures: Vec<FileFailure>,
}

impl EnforcementReport {
    /// True when every attempted removal succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A file found while walking the archive
#[derive(Debug)]
struct SizedFile {
    path: PathBuf,
    captured_at: NaiveDateTime,
    size_bytes: u64,
}

/// Evict the globally oldest files until the archive fits `max_total_bytes`
///
/// A file that fails to delete keeps counting towards the total; it is not
/// retried in this pass and will be picked up again by the next one.
pub fn enforce_budget(archive_root: &Path, max_total_bytes: u64) -> EnforcementReport {
    let mut report = EnforcementReport::default();

    if !archive_root.is_dir() {
        return report;
    }

    let mut files = scan_archive(archive_root, &mut report);
    // Stable: equal timestamps keep the walk's lexicographic path order
    files.sort_by_key(|file| file.captured_at);

    let mut total_bytes: u64 = files.iter().map(|file| file.size_bytes).sum();
    report.initial_bytes = total_bytes;

    for file in &files {
        if total_bytes <= max_total_bytes {
            break;
        }

        match fs::remove_file(&file.path) {
            Ok(()) => {
                info!(path = %file.path.display(), bytes = file.size_bytes, "Deleted old backup");
                total_bytes -= file.size_bytes;
                report.evicted.push(file.path.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %file.path.display(), "Backup already gone");
                total_bytes -= file.size_bytes;
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to delete backup");
                report
                    .failures
                    .push(FileFailure::new(&file.path, FailureKind::DeleteFailed, e));
            }
        }
    }

    report.final_bytes = total_bytes;
    prune_empty_dirs(archive_root, &mut report);
    report
}

/// Every regular file under the root with its size and ordering timestamp
fn scan_archive(archive_root: &Path, report: &mut EnforcementReport) -> Vec<SizedFile> {
    let mut files = Vec::new();

    for entry in WalkDir::new(archive_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Failed to read archive entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().ok();
        let size_bytes = metadata.as_ref().map_or(0, |m| m.len());

        let file_name = entry.file_name().to_string_lossy();
        let captured_at = match ArchiveName::decode(&file_name) {
            Ok(name) => name.captured_at,
            Err(e) => {
                debug!(path = %entry.path().display(), "Ordering by modification time");
                report
                    .undecodable
                    .push(FileFailure::new(entry.path(), FailureKind::DecodeFailed, e));
                metadata
                    .and_then(|m| m.modified().ok())
                    .map(|modified| DateTime::<Local>::from(modified).naive_local())
                    .unwrap_or(NaiveDateTime::MIN)
            }
        };

        files.push(SizedFile {
            path: entry.into_path(),
            captured_at,
            size_bytes,
        });
    }

    files
}

/// Remove every empty directory below the root, deepest first
fn prune_empty_dirs(archive_root: &Path, report: &mut EnforcementReport) {
    for entry in WalkDir::new(archive_root).min_depth(1).contents_first(true) {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let is_empty = match fs::read_dir(path) {
            Ok(mut children) => children.next().is_none(),
            Err(_) => false,
        };
        if !is_empty {
            continue;
        }

        match fs::remove_dir(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed empty bucket");
                report.pruned_dirs.push(path.to_path_buf());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove empty bucket");
                report
                    .failures
                    .push(FileFailure::new(path, FailureKind::DeleteFailed, e));
            }
        }
    }
}
