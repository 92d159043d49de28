//! SaveKeeper - rolling, size-capped backups of game save files
//!
//! Periodically snapshots a directory of save files into a dated, numbered
//! archive, keeps the archive under a total size budget by evicting the
//! oldest copies, and restores archived copies over the live saves.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and persisted settings
//! - `error`: Custom error types and per-file failure records
//! - `archive`: The archive engine (naming, capture, retention, catalog, restore)
//! - `scheduler`: Periodic runner with an overlap guard
//! - `display`: Text rendering of catalogs and reports
//! - `cli`: clap command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use savekeeper::archive::ArchiveManager;
//! use savekeeper::config::{SaveKeeperPaths, Settings};
//!
//! let paths = SaveKeeperPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let manager = ArchiveManager::new(settings.engine_config(&paths)?);
//! let pass = manager.run_pass()?;
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod scheduler;

pub use error::{SaveKeeperError, SaveKeeperResult};
