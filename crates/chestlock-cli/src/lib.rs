//! Chest Lock CLI - Command-line interface for the chest registry
//!
//! Lets operators inspect and repair a world's chest registry offline:
//! - Claim chests and link double chests
//! - Grant and remove OWNER, MOD and USER access
//! - Check a user's access to a chest
//! - List claimed chests with their owners and members

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chestlock_registry::{FileRegistryStorage, RegistryPersistence};

mod commands;
mod config;
mod error;
mod output;

use commands::{access, inspect};
use config::CliConfig;
pub use error::{CliError, CliResult};

/// Chest Lock CLI application
#[derive(Parser)]
#[command(name = "chestlock")]
#[command(about = "Chest Lock - manage claimed chests and their members", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CHESTLOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Registry save file (overrides the configuration file)
    #[arg(long, env = "CHESTLOCK_SAVE_FILE")]
    save_file: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Access(access::AccessCommands),

    #[command(flatten)]
    Inspect(inspect::InspectCommands),
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing; a subscriber may already be installed when embedded.
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    // Load config
    let config = CliConfig::load(cli.config.as_deref())?.with_save_file(cli.save_file);
    let storage = Arc::new(FileRegistryStorage::new(&config.registry.save_file));
    let persistence = RegistryPersistence::open(storage, config.registry.clone()).await?;
    let registry = persistence.registry();

    // Execute command
    match cli.command {
        Commands::Access(command) => {
            access::execute(command, &registry, cli.output)?;
            persistence.flush_if_dirty().await?;
            Ok(())
        }
        Commands::Inspect(command) => inspect::execute(command, &registry, cli.output),
    }
}
