//! User settings for SaveKeeper
//!
//! Settings are persisted as JSON and turned into an [`EngineConfig`] before a
//! pass starts. Every check that can reject a setting happens in that
//! conversion, so a running pass never has to fall back to a guessed default.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::SaveKeeperPaths;
use crate::error::{SaveKeeperError, SaveKeeperResult};

/// Bytes per configured megabyte
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Unit the capture interval is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
}

impl TimeUnit {
    fn seconds_per_unit(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Seconds => write!(f, "seconds"),
            TimeUnit::Minutes => write!(f, "minutes"),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = SaveKeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "minutes" => Ok(TimeUnit::Minutes),
            other => Err(SaveKeeperError::InvalidConfiguration(format!(
                "unknown time unit '{}' (expected seconds or minutes)",
                other
            ))),
        }
    }
}

/// User settings for SaveKeeper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Time between capture passes, in `time_unit`s
    #[serde(default = "default_backup_interval")]
    pub backup_interval: u64,

    #[serde(default)]
    pub time_unit: TimeUnit,

    /// Total archive size budget in megabytes
    #[serde(default = "default_max_backup_size_mb")]
    pub max_backup_size_mb: u64,

    /// Start watching when the binary runs without a command
    #[serde(default)]
    pub start_on_launch: bool,

    /// Source file names that are never archived
    #[serde(default = "default_excluded_files")]
    pub excluded_files: Vec<String>,

    /// Directory holding the live save files
    #[serde(default = "default_source_dir", skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Archive root; defaults to `backups/` under the base directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_root: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_backup_interval() -> u64 {
    300
}

fn default_max_backup_size_mb() -> u64 {
    100
}

fn default_excluded_files() -> Vec<String> {
    vec!["steam_autocloud.vdf".to_string()]
}

/// Kingdom Two Crowns keeps its saves under the LocalLow profile folder
#[cfg(windows)]
fn default_source_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join("AppData")
            .join("LocalLow")
            .join("noio")
            .join("KingdomTwoCrowns")
            .join("Release")
    })
}

#[cfg(not(windows))]
fn default_source_dir() -> Option<PathBuf> {
    None
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_interval: default_backup_interval(),
            time_unit: TimeUnit::default(),
            max_backup_size_mb: default_max_backup_size_mb(),
            start_on_launch: false,
            excluded_files: default_excluded_files(),
            source_dir: default_source_dir(),
            archive_root: None,
        }
    }
}

/// Validated values consumed by the archive engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub interval: Duration,
    pub max_total_bytes: u64,
    pub excluded_names: Vec<String>,
    pub source_dir: PathBuf,
    pub archive_root: PathBuf,
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    ///
    /// A settings file whose values have the wrong shape (for example a
    /// non-numeric interval) is rejected as `InvalidConfiguration`.
    pub fn load_or_create(paths: &SaveKeeperPaths) -> SaveKeeperResult<Self> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                SaveKeeperError::Io(format!("Failed to read settings file: {}", e))
            })?;

            serde_json::from_str(&contents).map_err(|e| {
                SaveKeeperError::InvalidConfiguration(format!(
                    "Failed to parse settings file {}: {}",
                    settings_path.display(),
                    e
                ))
            })
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SaveKeeperPaths) -> SaveKeeperResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SaveKeeperError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            SaveKeeperError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Resolved archive root
    pub fn archive_root(&self, paths: &SaveKeeperPaths) -> PathBuf {
        self.archive_root
            .clone()
            .unwrap_or_else(|| paths.default_archive_root())
    }

    /// Capture interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(
            self.backup_interval
                .saturating_mul(self.time_unit.seconds_per_unit()),
        )
    }

    /// Size budget in bytes
    pub fn max_total_bytes(&self) -> u64 {
        self.max_backup_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Validate the settings and produce the engine's view of them
    pub fn engine_config(&self, paths: &SaveKeeperPaths) -> SaveKeeperResult<EngineConfig> {
        if self.backup_interval == 0 {
            return Err(SaveKeeperError::InvalidConfiguration(
                "backup interval must be greater than zero".into(),
            ));
        }
        if self.max_backup_size_mb == 0 {
            return Err(SaveKeeperError::InvalidConfiguration(
                "max backup size must be greater than zero".into(),
            ));
        }
        let source_dir = self.source_dir.clone().ok_or_else(|| {
            SaveKeeperError::InvalidConfiguration(
                "no source directory configured (run `savekeeper config set source <dir>`)".into(),
            )
        })?;

        Ok(EngineConfig {
            interval: self.interval(),
            max_total_bytes: self.max_total_bytes(),
            excluded_names: self.excluded_files.clone(),
            source_dir,
            archive_root: self.archive_root(paths),
        })
    }

    /// Update one setting from user-entered text
    pub fn set_value(&mut self, key: &str, value: &str) -> SaveKeeperResult<()> {
        match key {
            "interval" => self.backup_interval = parse_number("backup interval", value)?,
            "unit" => self.time_unit = value.parse()?,
            "max-size" => self.max_backup_size_mb = parse_size_mb(value)?,
            "start-on-launch" => {
                self.start_on_launch = value.trim().parse().map_err(|_| {
                    SaveKeeperError::InvalidConfiguration(format!(
                        "start-on-launch must be true or false, got '{}'",
                        value
                    ))
                })?
            }
            "source" => self.source_dir = Some(PathBuf::from(value)),
            "archive" => self.archive_root = Some(PathBuf::from(value)),
            "exclude" => {
                if !self.excluded_files.iter().any(|name| name == value) {
                    self.excluded_files.push(value.to_string());
                }
            }
            "include" => self.excluded_files.retain(|name| name != value),
            other => {
                return Err(SaveKeeperError::Config(format!(
                    "unknown setting '{}'",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// Parse a capture interval typed by the user
pub fn parse_interval(text: &str, unit: TimeUnit) -> SaveKeeperResult<Duration> {
    let value = parse_number("backup interval", text)?;
    Ok(Duration::from_secs(
        value.saturating_mul(unit.seconds_per_unit()),
    ))
}

/// Parse a size budget in megabytes typed by the user
pub fn parse_size_mb(text: &str) -> SaveKeeperResult<u64> {
    parse_number("max backup size", text)
}

fn parse_number(what: &str, text: &str) -> SaveKeeperResult<u64> {
    text.trim().parse().map_err(|_| {
        SaveKeeperError::InvalidConfiguration(format!("invalid {}: '{}'", what, text))
    })
}
