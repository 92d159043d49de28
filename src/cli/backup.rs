//! Backup CLI commands
//!
//! Implements the capture, listing, pruning, restore and delete commands.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Subcommand;
use tracing::warn;

use crate::archive::{
    delete_bucket, delete_entry, is_inside, select_exact, select_for_bucket, ArchiveEntry,
    ArchiveManager, Bucket, Catalog, Confirmation, BUCKET_DATE_FORMAT,
};
use crate::config::paths::SaveKeeperPaths;
use crate::config::settings::Settings;
use crate::display::{
    format_capture_report, format_catalog, format_enforcement_report, format_entry_line,
    format_restore_candidates, format_restore_result,
};
use crate::error::{SaveKeeperError, SaveKeeperResult};
use crate::scheduler::PeriodicRunner;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Capture the save files now, then enforce the size budget
    Capture,

    /// List all backups grouped by day
    List {
        /// Show original file names and sizes
        #[arg(short, long)]
        long: bool,
    },

    /// Delete the oldest backups until the archive fits the size budget
    Prune,

    /// Restore a backup over the live save file
    Restore {
        /// Day (YYYY-MM-DD or 'latest'), backup file name, or path
        target: String,

        /// Restore the day's previous backup instead of its latest
        #[arg(short, long)]
        previous: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete a whole day or a single backup
    Delete {
        /// Day (YYYY-MM-DD), backup file name, or path
        target: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Back up periodically until Enter is pressed
    Watch {
        /// Stop after this many seconds instead of waiting for Enter
        #[arg(short, long)]
        duration: Option<u64>,
    },
}

/// A restore or delete target resolved against the catalog
enum Target<'a> {
    Bucket(&'a Bucket),
    Entry(ArchiveEntry),
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &SaveKeeperPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> SaveKeeperResult<()> {
    match cmd {
        BackupCommands::Capture => {
            let manager = ArchiveManager::new(settings.engine_config(paths)?);
            let pass = manager.run_pass()?;

            println!("{}", format_capture_report(&pass.capture));
            println!(
                "{}",
                format_enforcement_report(&pass.enforcement, manager.config().max_total_bytes)
            );
        }

        BackupCommands::List { long } => {
            let catalog = Catalog::list_all(&settings.archive_root(paths))?;
            println!("{}", format_catalog(&catalog, long));
        }

        BackupCommands::Prune => {
            let manager = ArchiveManager::new(settings.engine_config(paths)?);
            let report = manager.enforce();
            println!(
                "{}",
                format_enforcement_report(&report, manager.config().max_total_bytes)
            );
        }

        BackupCommands::Restore {
            target,
            previous,
            force,
        } => {
            let manager = ArchiveManager::new(settings.engine_config(paths)?);
            let catalog = manager.catalog()?;

            let archive_root = &manager.config().archive_root;
            let entry = match resolve_target(&catalog, archive_root, &target)? {
                Target::Bucket(bucket) => {
                    let candidates = select_for_bucket(bucket).ok_or_else(|| {
                        SaveKeeperError::entry_not_found(format!(
                            "any backup for {}",
                            bucket.label()
                        ))
                    })?;
                    println!("Backups for {}:", bucket.label());
                    println!("{}", format_restore_candidates(&candidates));
                    println!();

                    if previous {
                        candidates.previous.cloned().ok_or_else(|| {
                            SaveKeeperError::entry_not_found(format!(
                                "previous backup for {}",
                                bucket.label()
                            ))
                        })?
                    } else {
                        candidates.latest.clone()
                    }
                }
                Target::Entry(entry) => select_exact(&entry).clone(),
            };

            println!("Selected: {}", format_entry_line(&entry));
            println!(
                "Destination: {}",
                manager.config().source_dir.join(&entry.original_name).display()
            );

            if !force {
                println!();
                println!("WARNING: This will overwrite the live save file!");
                println!("To proceed, run again with --force flag:");
                println!(
                    "  savekeeper restore {}{} --force",
                    target,
                    if previous { " --previous" } else { "" }
                );
                return Ok(());
            }

            let result = manager.restore(&entry, Confirmation::confirmed())?;
            println!("{}", format_restore_result(&result));
        }

        BackupCommands::Delete { target, force } => {
            let archive_root = settings.archive_root(paths);
            let catalog = Catalog::list_all(&archive_root)?;
            let resolved = resolve_target(&catalog, &archive_root, &target)?;

            let description = match &resolved {
                Target::Bucket(bucket) => format!("all backups of {}", bucket.label()),
                Target::Entry(entry) => format_entry_line(entry),
            };

            if !force {
                println!("This will delete {}.", description);
                println!("To proceed, run again with --force flag:");
                println!("  savekeeper delete {} --force", target);
                return Ok(());
            }

            match resolved {
                Target::Bucket(bucket) => {
                    let path = delete_bucket(bucket, Confirmation::confirmed())?;
                    println!("Deleted backup folder: {}", path.display());
                }
                Target::Entry(entry) => {
                    delete_entry(&archive_root, &entry, Confirmation::confirmed())?;
                    println!("Deleted backup file: {}", entry.path.display());
                }
            }
        }

        BackupCommands::Watch { duration } => {
            run_watch(paths, settings, duration.map(Duration::from_secs))?;
        }
    }

    Ok(())
}

/// Run the periodic backup loop until Enter is pressed or `duration` elapses
///
/// The configuration is validated before the first pass.
pub fn run_watch(
    paths: &SaveKeeperPaths,
    settings: &Settings,
    duration: Option<Duration>,
) -> SaveKeeperResult<()> {
    let manager = Arc::new(ArchiveManager::new(settings.engine_config(paths)?));
    let interval = manager.config().interval;

    println!(
        "Backing up {} every {}s into {}",
        manager.config().source_dir.display(),
        interval.as_secs(),
        manager.config().archive_root.display()
    );

    let worker = Arc::clone(&manager);
    let mut runner = PeriodicRunner::start(interval, move || match worker.run_pass() {
        Ok(pass) => {
            println!("{}", format_capture_report(&pass.capture));
            if !pass.enforcement.evicted.is_empty() || !pass.enforcement.is_clean() {
                println!(
                    "{}",
                    format_enforcement_report(&pass.enforcement, worker.config().max_total_bytes)
                );
            }
        }
        Err(e) => warn!(error = %e, "Backup pass failed"),
    });

    match duration {
        Some(duration) => std::thread::sleep(duration),
        None => {
            println!("Press Enter to stop.");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
        }
    }

    runner.stop();
    let status = runner.status();
    println!(
        "Stopped after {} pass(es) ({} skipped tick(s)).",
        status.completed_passes, status.skipped_ticks
    );
    Ok(())
}

/// Resolve a day, file name or path to a catalog bucket or entry
///
/// Paths are only accepted below `archive_root`.
fn resolve_target<'a>(
    catalog: &'a Catalog,
    archive_root: &Path,
    target: &str,
) -> SaveKeeperResult<Target<'a>> {
    if target.eq_ignore_ascii_case("latest") {
        return catalog
            .latest_bucket()
            .map(Target::Bucket)
            .ok_or_else(|| SaveKeeperError::bucket_not_found("latest"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(target, BUCKET_DATE_FORMAT) {
        return catalog
            .bucket(date)
            .map(Target::Bucket)
            .ok_or_else(|| SaveKeeperError::bucket_not_found(target));
    }

    if let Some(entry) = catalog.find_entry(target) {
        return Ok(Target::Entry(entry.clone()));
    }

    let path = PathBuf::from(target);
    if path.is_file() {
        if !is_inside(archive_root, &path) {
            return Err(SaveKeeperError::entry_not_found(format!(
                "{} in {}",
                target,
                archive_root.display()
            )));
        }
        return ArchiveEntry::from_path(&path).map(Target::Entry);
    }

    if let Some(file_name) = Path::new(target).file_name() {
        if let Some(entry) = catalog.find_entry(&file_name.to_string_lossy()) {
            return Ok(Target::Entry(entry.clone()));
        }
    }

    Err(SaveKeeperError::entry_not_found(target))
}
