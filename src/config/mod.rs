//! Configuration module for SaveKeeper
//!
//! This module provides configuration management including:
//! - Base directory resolution
//! - User settings persistence
//! - Validation of the values the archive engine consumes

pub mod paths;
pub mod settings;

pub use paths::SaveKeeperPaths;
pub use settings::{EngineConfig, Settings, TimeUnit};
