//! Defer CLI - run deferred-loading workloads from the terminal.
//!
//! Commands:
//! - `defer deferred` - Load the deferred route, showing boundaries as they settle
//! - `defer table` - Render the data table for a query string
//! - `defer config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, DeferredArgs, TableArgs};
use defer_sdk::defer_observability::{init_logging, LogFormat, LogLevel};

/// Defer CLI - Run deferred-loading workloads
#[derive(Parser)]
#[command(name = "defer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the deferred route
    Deferred(DeferredArgs),

    /// Render the data table for a query string
    Table(TableArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let mut logging = ctx.config.logging.clone();
    if cli.verbose {
        logging.level = logging.level.min(LogLevel::Debug);
    }
    if cli.json {
        logging.format = LogFormat::Json;
    }
    init_logging(&logging)?;

    // Execute command
    let result = match cli.command {
        Commands::Deferred(args) => commands::deferred::run(args, &ctx).await,
        Commands::Table(args) => commands::table::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
