//! Archive engine for SaveKeeper
//!
//! Snapshots a directory of save files into a day-bucketed archive, keeps the
//! archive under a total size budget and copies archived saves back.
//!
//! # Layout
//!
//! ```text
//! {archive_root}/{YYYY-MM-DD}/{sequence}-{original_name}-{YYYY-MM-DD-HH-MM-SS}
//! ```
//!
//! All metadata lives in the file names (see [`codec`]); there is no index.
//!
//! # Components
//!
//! - [`writer`]: captures source files into today's bucket
//! - [`retention`]: evicts the globally oldest copies until under budget
//! - [`catalog`]: lists buckets and entries for display and restore
//! - [`restore`]: picks restore candidates and copies them back
//! - [`delete`]: confirmed manual removal of buckets and entries
//! - [`manager`]: runs one capture, enforce, list pass over a configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use savekeeper::archive::ArchiveManager;
//!
//! let manager = ArchiveManager::new(settings.engine_config(&paths)?);
//! let pass = manager.run_pass()?;
//! println!("{} file(s) captured", pass.capture.written.len());
//! ```

pub mod catalog;
pub mod codec;
pub mod delete;
pub mod manager;
pub mod restore;
pub mod retention;
pub mod writer;

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;

pub use catalog::{ArchiveEntry, Bucket, Catalog};
pub use codec::ArchiveName;
pub use delete::{delete_bucket, delete_entry};
pub use manager::{ArchiveManager, PassReport};
pub use restore::{restore, select_exact, select_for_bucket, Confirmation, RestoreCandidates, RestoreResult};
pub use retention::{enforce_budget, EnforcementReport};
pub use writer::{capture_all, capture_all_at, CaptureReport};

/// Directory name format of a day bucket
pub const BUCKET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether `path` lies strictly below `root` once both are resolved
///
/// Paths that cannot be resolved (missing files, broken links) are never inside.
pub(crate) fn is_inside(root: &Path, path: &Path) -> bool {
    match (root.canonicalize(), path.canonicalize()) {
        (Ok(root), Ok(path)) => path != root && path.starts_with(&root),
        _ => false,
    }
}

/// Copy a file's bytes, timestamps and permissions
///
/// Overwrites `dest` if it exists. Returns the number of bytes copied.
pub(crate) fn copy_with_metadata(src: &Path, dest: &Path) -> io::Result<u64> {
    let metadata = fs::metadata(src)?;
    let mut reader = File::open(src)?;
    let mut writer = File::create(dest)?;
    let bytes = io::copy(&mut reader, &mut writer)?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    writer.set_times(times)?;
    writer.sync_all()?;
    drop(writer);

    fs::set_permissions(dest, metadata.permissions())?;
    Ok(bytes)
}
