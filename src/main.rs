use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use savekeeper::cli::{
    handle_backup_command, handle_config_command, run_watch, BackupCommands, ConfigCommands,
};
use savekeeper::config::{paths::SaveKeeperPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "savekeeper",
    version,
    about = "Rolling, size-capped backups of game save files",
    long_about = "SaveKeeper copies your save files into a dated, numbered archive \
                  on a timer, deletes the oldest copies once the archive grows past \
                  its size budget, and lets you put any archived copy back."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Backup(BackupCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let paths = SaveKeeperPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Backup(cmd)) => handle_backup_command(&paths, &settings, cmd)?,
        Some(Commands::Config(cmd)) => handle_config_command(&paths, &mut settings, cmd)?,
        None if settings.start_on_launch => run_watch(&paths, &settings, None)?,
        None => {
            println!("SaveKeeper - rolling backups of game save files");
            println!();
            println!("Run 'savekeeper --help' for usage information.");
            println!("Run 'savekeeper config set source <dir>' to choose the save folder.");
        }
    }

    Ok(())
}
