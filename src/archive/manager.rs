//! Archive manager for SaveKeeper
//!
//! Binds the engine operations to one validated configuration and runs the
//! scheduled pass: capture, then enforce the budget, then list.

use serde::Serialize;
use tracing::info;

use super::catalog::{ArchiveEntry, Catalog};
use super::restore::{self, Confirmation, RestoreResult};
use super::retention::{self, EnforcementReport};
use super::writer::{self, CaptureReport};
use crate::config::settings::EngineConfig;
use crate::error::SaveKeeperResult;

/// Everything one scheduled pass produced
#[derive(Debug, Serialize)]
pub struct PassReport {
    pub capture: CaptureReport,
    pub enforcement: EnforcementReport,
    pub catalog: Catalog,
}

/// Runs archive operations against one configuration
pub struct ArchiveManager {
    config: EngineConfig,
}

impl ArchiveManager {
    /// Create a new ArchiveManager
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Copy the current source files into today's bucket
    pub fn capture(&self) -> CaptureReport {
        writer::capture_all(
            &self.config.source_dir,
            &self.config.excluded_names,
            &self.config.archive_root,
        )
    }

    /// Evict old copies until the archive fits the budget
    pub fn enforce(&self) -> EnforcementReport {
        retention::enforce_budget(&self.config.archive_root, self.config.max_total_bytes)
    }

    /// List the archive
    pub fn catalog(&self) -> SaveKeeperResult<Catalog> {
        Catalog::list_all(&self.config.archive_root)
    }

    /// Capture, enforce the budget and list, in that order
    pub fn run_pass(&self) -> SaveKeeperResult<PassReport> {
        let capture = self.capture();
        let enforcement = self.enforce();
        let catalog = self.catalog()?;

        info!(
            written = capture.written.len(),
            capture_failures = capture.failures.len(),
            evicted = enforcement.evicted.len(),
            archive_bytes = enforcement.final_bytes,
            "Backup pass complete"
        );

        Ok(PassReport {
            capture,
            enforcement,
            catalog,
        })
    }

    /// Copy an entry back into the source directory
    pub fn restore(
        &self,
        entry: &ArchiveEntry,
        confirmation: Confirmation,
    ) -> SaveKeeperResult<RestoreResult> {
        restore::restore(entry, &self.config.source_dir, confirmation)
    }
}
