//! Archive catalog
//!
//! A point-in-time listing of the archive: day buckets newest first, each
//! with its entries in sequence order. Files whose names don't decode are
//! left out of the listing (they still count towards the size budget).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use super::codec::ArchiveName;
use super::BUCKET_DATE_FORMAT;
use crate::error::{SaveKeeperError, SaveKeeperResult};

/// One archived copy of one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub sequence: u64,
    pub original_name: String,
    pub captured_at: NaiveDateTime,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl ArchiveEntry {
    /// Build an entry from an archive file on disk
    pub fn from_path(path: &Path) -> SaveKeeperResult<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| SaveKeeperError::decode(path.display().to_string(), "path has no file name"))?;
        let name = ArchiveName::decode(&file_name)?;

        let metadata = fs::metadata(path)
            .map_err(|_| SaveKeeperError::entry_not_found(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(SaveKeeperError::entry_not_found(path.display().to_string()));
        }

        Ok(Self {
            sequence: name.sequence,
            original_name: name.original_name,
            captured_at: name.captured_at,
            size_bytes: metadata.len(),
            path: path.to_path_buf(),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// All entries captured on one calendar day
#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    pub date: NaiveDate,
    pub path: PathBuf,
    /// Ascending by sequence number
    pub entries: Vec<ArchiveEntry>,
}

impl Bucket {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }

    /// Directory name of the bucket
    pub fn label(&self) -> String {
        self.date.format(BUCKET_DATE_FORMAT).to_string()
    }

    fn load(date: NaiveDate, path: PathBuf) -> SaveKeeperResult<Self> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(&path)? {
            let dir_entry = dir_entry?;
            let file_path = dir_entry.path();

            match ArchiveEntry::from_path(&file_path) {
                Ok(entry) => entries.push(entry),
                Err(e) => debug!(path = %file_path.display(), reason = %e, "Not listing file"),
            }
        }

        entries.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.captured_at.cmp(&b.captured_at))
        });

        Ok(Self {
            date,
            path,
            entries,
        })
    }
}

/// Listing of the whole archive
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    /// Newest date first
    pub buckets: Vec<Bucket>,
}

impl Catalog {
    /// Enumerate the archive under `archive_root`
    ///
    /// A missing root lists as empty. Directories not named like a date and
    /// buckets that cannot be read are skipped.
    pub fn list_all(archive_root: &Path) -> SaveKeeperResult<Self> {
        if !archive_root.is_dir() {
            return Ok(Self::default());
        }

        let mut buckets = Vec::new();

        for dir_entry in fs::read_dir(archive_root).map_err(|e| {
            SaveKeeperError::Io(format!(
                "Failed to read archive directory {}: {}",
                archive_root.display(),
                e
            ))
        })? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }

            let dir_name = dir_entry.file_name().to_string_lossy().to_string();
            let Ok(date) = NaiveDate::parse_from_str(&dir_name, BUCKET_DATE_FORMAT) else {
                debug!(dir = %dir_name, "Skipping directory that is not a day bucket");
                continue;
            };

            match Bucket::load(date, dir_entry.path()) {
                Ok(bucket) => buckets.push(bucket),
                Err(e) => warn!(dir = %dir_name, error = %e, "Failed to list bucket"),
            }
        }

        buckets.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(Self { buckets })
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.buckets.iter().map(Bucket::entry_count).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.buckets.iter().map(Bucket::total_bytes).sum()
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.date == date)
    }

    pub fn latest_bucket(&self) -> Option<&Bucket> {
        self.buckets.first()
    }

    /// Find an entry by its archive file name
    pub fn find_entry(&self, file_name: &str) -> Option<&ArchiveEntry> {
        self.buckets
            .iter()
            .flat_map(|b| b.entries.iter())
            .find(|e| e.file_name() == file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, day: &str, name: &str, size: usize) {
        let dir = root.join(day);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), vec![1u8; size]).unwrap();
    }

    #[test]
    fn test_missing_root_lists_empty() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::list_all(&temp_dir.path().join("nope")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_ordering_and_aggregates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "2024-01-02", "10-save.dat-2024-01-02-12-00-00", 5);
        write(root, "2024-01-02", "2-save.dat-2024-01-02-09-00-00", 3);
        write(root, "2024-01-03", "1-save.dat-2024-01-03-08-00-00", 4);
        write(root, "2024-01-01", "1-save.dat-2024-01-01-08-00-00", 1);

        let catalog = Catalog::list_all(root).unwrap();

        let dates: Vec<String> = catalog.buckets.iter().map(Bucket::label).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);

        let day = &catalog.buckets[1];
        let sequences: Vec<u64> = day.entries.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![2, 10]);
        assert_eq!(day.entry_count(), 2);
        assert_eq!(day.total_bytes(), 8);
        assert_eq!(catalog.entry_count(), 4);
        assert_eq!(catalog.total_bytes(), 13);
    }

    #[test]
    fn test_undecodable_files_and_foreign_dirs_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "2024-01-02", "1-save.dat-2024-01-02-12-00-00", 5);
        write(root, "2024-01-02", "readme.txt", 50);
        write(root, "misc", "1-save.dat-2024-01-02-12-00-00", 5);
        fs::write(root.join("loose-file"), b"").unwrap();

        let catalog = Catalog::list_all(root).unwrap();

        assert_eq!(catalog.buckets.len(), 1);
        assert_eq!(catalog.buckets[0].entry_count(), 1);
        assert_eq!(catalog.buckets[0].total_bytes(), 5);
        assert!(root.join("2024-01-02").join("readme.txt").exists());
    }

    #[test]
    fn test_find_entry() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "2024-01-02", "1-a-b-2024-01-02-12-00-00", 5);

        let catalog = Catalog::list_all(root).unwrap();
        let entry = catalog.find_entry("1-a-b-2024-01-02-12-00-00").unwrap();
        assert_eq!(entry.original_name, "a-b");
        assert!(catalog.find_entry("2-a-b-2024-01-02-12-00-00").is_none());
        assert_eq!(
            catalog.latest_bucket().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_entry_from_path_errors() {
        let temp_dir = TempDir::new().unwrap();
        let bad = temp_dir.path().join("bad-name");
        fs::write(&bad, b"").unwrap();
        assert!(matches!(
            ArchiveEntry::from_path(&bad),
            Err(SaveKeeperError::Decode { .. })
        ));

        let missing = temp_dir.path().join("1-save.dat-2024-01-02-12-00-00");
        assert!(ArchiveEntry::from_path(&missing).unwrap_err().is_not_found());
    }
}
