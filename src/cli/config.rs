//! Configuration CLI commands

use clap::Subcommand;

use crate::config::paths::SaveKeeperPaths;
use crate::config::settings::Settings;
use crate::error::SaveKeeperResult;

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration and paths
    Show,

    /// Change a setting
    ///
    /// Keys: interval, unit, max-size, start-on-launch, source, archive,
    /// exclude (add a file name), include (remove an exclusion)
    Set {
        key: String,
        value: String,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &SaveKeeperPaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> SaveKeeperResult<()> {
    match cmd {
        ConfigCommands::Show => print_settings(paths, settings),
        ConfigCommands::Set { key, value } => {
            settings.set_value(&key, &value)?;
            settings.save(paths)?;
            println!("Updated {}.", key);
        }
    }

    Ok(())
}

fn print_settings(paths: &SaveKeeperPaths, settings: &Settings) {
    println!("SaveKeeper Configuration");
    println!("========================");
    println!("Config file:      {}", paths.settings_file().display());
    println!(
        "Source directory: {}",
        settings
            .source_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "Archive root:     {}",
        settings.archive_root(paths).display()
    );
    println!();
    println!("Settings:");
    println!(
        "  Backup interval:  {} {}",
        settings.backup_interval, settings.time_unit
    );
    println!("  Max backup size:  {} MB", settings.max_backup_size_mb);
    println!("  Start on launch:  {}", settings.start_on_launch);
    println!("  Excluded files:   {}", settings.excluded_files.join(", "));
}
