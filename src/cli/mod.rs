//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the archive engine.

pub mod backup;
pub mod config;

pub use backup::{handle_backup_command, run_watch, BackupCommands};
pub use config::{handle_config_command, ConfigCommands};
