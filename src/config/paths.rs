//! Path management for SaveKeeper
//!
//! ## Path Resolution Order
//!
//! 1. `SAVEKEEPER_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/savekeeper` on Linux, `%APPDATA%\savekeeper\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::SaveKeeperError;

/// Manages all paths used by SaveKeeper
#[derive(Debug, Clone)]
pub struct SaveKeeperPaths {
    /// Base directory for all SaveKeeper data
    base_dir: PathBuf,
}

impl SaveKeeperPaths {
    /// Create a new SaveKeeperPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, SaveKeeperError> {
        let base_dir = if let Ok(custom) = std::env::var("SAVEKEEPER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create SaveKeeperPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Default archive root when the settings don't name one
    pub fn default_archive_root(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), SaveKeeperError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SaveKeeperError::Io(format!("Failed to create base directory: {}", e)))?;
        Ok(())
    }

    /// Check if SaveKeeper has been configured (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, SaveKeeperError> {
    ProjectDirs::from("", "", "savekeeper")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| SaveKeeperError::Config("Could not determine home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SaveKeeperPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.default_archive_root(), temp_dir.path().join("backups"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var("SAVEKEEPER_DATA_DIR", custom_path);

        let paths = SaveKeeperPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        env::remove_var("SAVEKEEPER_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SaveKeeperPaths::with_base_dir(temp_dir.path().join("nested"));

        assert!(!paths.is_initialized());
        paths.ensure_directories().unwrap();
        assert!(paths.base_dir().exists());
    }
}
