//! Archive writer
//!
//! Copies every regular file of the source directory into today's bucket
//! under a freshly numbered archive name. The source is only ever read.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::codec::ArchiveName;
use super::{copy_with_metadata, BUCKET_DATE_FORMAT};
use crate::error::{FailureKind, FileFailure};

/// Outcome of one capture pass
#[derive(Debug, Default, Serialize)]
pub struct CaptureReport {
    /// Archive files written in this pass
    pub written: Vec<PathBuf>,
    /// Source files that could not be archived
    pub failures: Vec<FileFailure>,
    /// The source directory did not exist, nothing was attempted
    pub source_unavailable: bool,
}

impl CaptureReport {
    /// True when every source file was archived
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Capture all source files using the local clock
pub fn capture_all(source_dir: &Path, excluded_names: &[String], archive_root: &Path) -> CaptureReport {
    capture_all_at(source_dir, excluded_names, archive_root, Local::now().naive_local())
}

/// Capture all source files as if it were `now`
///
/// `now` picks the bucket (its date) and the timestamp embedded in every
/// archive name written by this pass.
pub fn capture_all_at(
    source_dir: &Path,
    excluded_names: &[String],
    archive_root: &Path,
    now: NaiveDateTime,
) -> CaptureReport {
    let mut report = CaptureReport::default();

    if !source_dir.is_dir() {
        warn!(source = %source_dir.display(), "Source directory does not exist, skipping capture");
        report.source_unavailable = true;
        return report;
    }

    let sources = match list_source_files(source_dir, excluded_names) {
        Ok(sources) => sources,
        Err(e) => {
            warn!(source = %source_dir.display(), error = %e, "Failed to read source directory");
            report
                .failures
                .push(FileFailure::new(source_dir, FailureKind::SourceUnavailable, e));
            return report;
        }
    };

    let bucket_dir = archive_root.join(now.date().format(BUCKET_DATE_FORMAT).to_string());

    for (file_name, src) in sources {
        match capture_one(&src, &file_name, &bucket_dir, now) {
            Ok(dest) => {
                info!(source = %src.display(), dest = %dest.display(), "Backed up file");
                report.written.push(dest);
            }
            Err(e) => {
                warn!(source = %src.display(), error = %e, "Failed to back up file");
                report
                    .failures
                    .push(FileFailure::new(src, FailureKind::CopyFailed, e));
            }
        }
    }

    report
}

/// Regular, non-excluded files directly inside `source_dir`, sorted by name
fn list_source_files(
    source_dir: &Path,
    excluded_names: &[String],
) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut sources = Vec::new();

    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();

        if excluded_names.iter().any(|excluded| *excluded == file_name) {
            debug!(file = %file_name, "Skipping excluded file");
            continue;
        }
        // DirEntry::file_type does not follow symlinks
        if !entry.file_type()?.is_file() {
            debug!(file = %file_name, "Skipping non-regular entry");
            continue;
        }

        sources.push((file_name, entry.path()));
    }

    sources.sort();
    Ok(sources)
}

fn capture_one(
    src: &Path,
    file_name: &str,
    bucket_dir: &Path,
    now: NaiveDateTime,
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(bucket_dir)?;

    let name = ArchiveName::new(next_sequence(bucket_dir)?, file_name, now);
    let dest = bucket_dir.join(name.encode());
    if let Err(e) = copy_with_metadata(src, &dest) {
        // a truncated copy must never be listed as an entry
        match fs::remove_file(&dest) {
            Ok(()) => debug!(dest = %dest.display(), "Removed partial backup"),
            Err(cleanup) if cleanup.kind() == std::io::ErrorKind::NotFound => {}
            Err(cleanup) => {
                warn!(dest = %dest.display(), error = %cleanup, "Failed to remove partial backup")
            }
        }
        return Err(e);
    }
    Ok(dest)
}

/// `max(existing sequence numbers) + 1`, or 1 for an empty bucket
///
/// Fails once the bucket already holds the largest representable sequence.
pub fn next_sequence(bucket_dir: &Path) -> std::io::Result<u64> {
    let mut max: u64 = 0;

    for entry in fs::read_dir(bucket_dir)? {
        let entry = entry?;
        if let Ok(name) = ArchiveName::decode(&entry.file_name().to_string_lossy()) {
            max = max.max(name.sequence);
        }
    }

    max.checked_add(1).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("no sequence numbers left in {}", bucket_dir.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("saves");
        let archive = temp_dir.path().join("backups");
        fs::create_dir_all(&source).unwrap();
        (temp_dir, source, archive)
    }

    fn bucket_names(bucket: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(bucket)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_missing_source_is_noop() {
        let (temp_dir, _source, archive) = setup();
        let report = capture_all(&temp_dir.path().join("nope"), &[], &archive);

        assert!(report.source_unavailable);
        assert!(report.written.is_empty());
        assert!(report.is_clean());
        assert!(!archive.exists());
    }

    #[test]
    fn test_capture_writes_named_copy() {
        let (_temp, source, archive) = setup();
        fs::write(source.join("global-v35"), b"crowns").unwrap();

        let report = capture_all_at(&source, &[], &archive, at(8, 14, 29, 30));

        assert_eq!(report.written.len(), 1);
        let expected = archive.join("2025-02-08").join("1-global-v35-2025-02-08-14-29-30");
        assert_eq!(report.written[0], expected);
        assert_eq!(fs::read(&expected).unwrap(), b"crowns");
        assert_eq!(fs::read(source.join("global-v35")).unwrap(), b"crowns");
    }

    #[test]
    fn test_sequence_numbers_increase_per_bucket() {
        let (_temp, source, archive) = setup();
        fs::write(source.join("save.dat"), b"x").unwrap();

        for minute in 0..3 {
            capture_all_at(&source, &[], &archive, at(8, 10, minute, 0));
        }
        // a new day starts again at 1
        capture_all_at(&source, &[], &archive, at(9, 0, 0, 0));

        let day_one = bucket_names(&archive.join("2025-02-08"));
        let sequences: Vec<u64> = day_one
            .iter()
            .map(|n| ArchiveName::decode(n).unwrap().sequence)
            .collect();
        let mut sorted = sequences.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3]);

        assert_eq!(
            bucket_names(&archive.join("2025-02-09")),
            vec!["1-save.dat-2025-02-09-00-00-00"]
        );
    }

    #[test]
    fn test_sequence_continues_after_gap() {
        let (_temp, source, archive) = setup();
        fs::write(source.join("save.dat"), b"x").unwrap();

        let first = capture_all_at(&source, &[], &archive, at(8, 10, 0, 0));
        capture_all_at(&source, &[], &archive, at(8, 10, 1, 0));
        fs::remove_file(&first.written[0]).unwrap();

        let third = capture_all_at(&source, &[], &archive, at(8, 10, 2, 0));
        let name = third.written[0].file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(ArchiveName::decode(&name).unwrap().sequence, 3);
    }

    #[test]
    fn test_files_in_one_pass_get_distinct_sequences() {
        let (_temp, source, archive) = setup();
        fs::write(source.join("a.dat"), b"a").unwrap();
        fs::write(source.join("b.dat"), b"b").unwrap();

        let report = capture_all_at(&source, &[], &archive, at(8, 10, 0, 0));
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            bucket_names(&archive.join("2025-02-08")),
            vec![
                "1-a.dat-2025-02-08-10-00-00",
                "2-b.dat-2025-02-08-10-00-00"
            ]
        );
    }

    #[test]
    fn test_excluded_and_non_regular_entries_skipped() {
        let (_temp, source, archive) = setup();
        fs::write(source.join("steam_autocloud.vdf"), b"cloud").unwrap();
        fs::create_dir(source.join("subdir")).unwrap();
        fs::write(source.join("save.dat"), b"x").unwrap();

        let excluded = vec!["steam_autocloud.vdf".to_string()];
        let report = capture_all_at(&source, &excluded, &archive, at(8, 10, 0, 0));

        assert_eq!(report.written.len(), 1);
        assert!(report.is_clean());
        assert_eq!(
            bucket_names(&archive.join("2025-02-08")),
            vec!["1-save.dat-2025-02-08-10-00-00"]
        );
    }

    #[test]
    fn test_exhausted_sequence_is_copy_failure() {
        let (_temp, source, archive) = setup();
        fs::write(source.join("save.dat"), b"x").unwrap();
        let bucket = archive.join("2025-02-08");
        fs::create_dir_all(&bucket).unwrap();
        let last = format!("{}-save.dat-2025-02-08-09-00-00", u64::MAX);
        fs::write(bucket.join(&last), b"x").unwrap();

        let report = capture_all_at(&source, &[], &archive, at(8, 10, 0, 0));

        assert!(report.written.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::CopyFailed);
        assert_eq!(bucket_names(&bucket), vec![last]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_leaves_no_partial_entry() {
        let (_temp, source, archive) = setup();
        let bucket = archive.join("2025-02-08");
        // opening a directory succeeds on unix, reading it does not
        let unreadable = source.join("save.dat");
        fs::create_dir(&unreadable).unwrap();

        let result = capture_one(&unreadable, "save.dat", &bucket, at(8, 10, 0, 0));

        assert!(result.is_err());
        assert!(bucket_names(&bucket).is_empty());
        assert_eq!(next_sequence(&bucket).unwrap(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_failure_does_not_abort_pass() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, source, archive) = setup();
        let locked = source.join("a.dat");
        fs::write(&locked, b"a").unwrap();
        fs::write(source.join("b.dat"), b"b").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::File::open(&locked).is_ok() {
            // running as root, permissions are not enforced
            return;
        }

        let report = capture_all_at(&source, &[], &archive, at(8, 10, 0, 0));

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, locked);
        assert_eq!(report.failures[0].kind, FailureKind::CopyFailed);
        assert_eq!(
            report.written,
            vec![archive.join("2025-02-08").join("1-b.dat-2025-02-08-10-00-00")]
        );
    }

    #[test]
    fn test_next_sequence_ignores_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"").unwrap();
        fs::write(temp_dir.path().join("4-save.dat-2025-02-08-10-00-00"), b"").unwrap();

        assert_eq!(next_sequence(temp_dir.path()).unwrap(), 5);
    }
}
