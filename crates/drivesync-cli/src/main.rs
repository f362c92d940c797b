//! drivesync CLI - Command-line interface for drivesync
//!
//! Provides commands for:
//! - Scanning a local folder against a Drive folder
//! - Resolving the differences interactively or with a batch policy
//! - Inspecting remote nodes
//! - Viewing and validating configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod credentials;
mod output;

use commands::{
    config::ConfigCommand,
    find::{FindCommand, InfoCommand},
    menu::MenuCommand,
    resolve::ResolveCommand,
    scan::ScanCommand,
    sync::SyncCommand,
    GlobalArgs,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "drivesync",
    version,
    about = "Reconcile a local folder with a Google Drive folder"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare the local folder with Drive without changing anything
    Scan(ScanCommand),
    /// Scan, then decide what to do with each difference
    Resolve(ResolveCommand),
    /// Scan, then apply one decision per category to every difference
    Sync(SyncCommand),
    /// Interactive menu
    Menu(MenuCommand),
    /// Show the metadata of a remote node
    Info(InfoCommand),
    /// Find remote nodes by name
    Find(FindCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = GlobalArgs {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
        quiet: cli.quiet,
        config_path: cli.config.map(Into::into),
    };

    // Setup tracing: RUST_LOG, then -v, then the configured level
    let filter = match cli.verbose {
        0 => args.load_config_or_default().logging.level,
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(cmd) => cmd.execute(&args).await,
        Commands::Resolve(cmd) => cmd.execute(&args).await,
        Commands::Sync(cmd) => cmd.execute(&args).await,
        Commands::Menu(cmd) => cmd.execute(&args).await,
        Commands::Info(cmd) => cmd.execute(&args).await,
        Commands::Find(cmd) => cmd.execute(&args).await,
        Commands::Config(cmd) => cmd.execute(&args).await,
    }
}
