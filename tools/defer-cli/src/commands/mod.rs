//! CLI command implementations.

pub mod config;
pub mod deferred;
pub mod table;

use clap::{Args, Subcommand};

/// Arguments for the deferred command.
#[derive(Args)]
pub struct DeferredArgs {
    /// Route config file (TOML or JSON) overriding the `[route]` section.
    #[arg(long)]
    pub route_config: Option<String>,

    /// Stream the route's HTML to stdout instead of showing spinners.
    #[arg(long)]
    pub html: bool,
}

/// Arguments for the table command.
#[derive(Args)]
pub struct TableArgs {
    /// Query string, e.g. `sort=desc&sortBy=createdAt&status=active`.
    pub query: Option<String>,

    /// Number of rows to generate.
    #[arg(short = 'n', long, default_value_t = data_table::DEFAULT_ITEM_COUNT)]
    pub count: u32,

    /// Print the rendered HTML page.
    #[arg(long)]
    pub html: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Write a default defer.toml in the current directory.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}
