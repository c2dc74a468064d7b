mod commands;
mod context;
mod render;
mod zone_table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::context::Context;

#[derive(Parser)]
#[command(name = "graphcal")]
#[command(about = "Inspect calendar service event payloads with their time zones normalized")]
struct Cli {
    /// Zone table JSON file (overrides `zone_table` in the config)
    #[arg(long, global = true)]
    zones: Option<PathBuf>,

    /// Zone for all-day events: "local", "UTC" or an IANA name (overrides the config)
    #[arg(long, global = true)]
    all_day_zone: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the zones in the zone table
    Zones,
    /// Show which zone a raw zone string resolves to
    Resolve { raw: String },
    /// Decode a `{"value": [...]}` payload and print its events in start order
    Events {
        payload: PathBuf,

        /// Only show events running at this time (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        at: Option<String>,

        /// Zone the --at time is given in (defaults to UTC)
        #[arg(long, requires = "at")]
        zone: Option<String>,
    },
    /// Find the event created with a transaction id
    Find {
        payload: PathBuf,
        transaction_id: String,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a config file (commented defaults unless overrides are given)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let load = || Context::load(cli.zones.as_deref(), cli.all_day_zone.as_deref());

    match cli.command {
        Commands::Zones => commands::zones::run(&load()?),
        Commands::Resolve { ref raw } => commands::resolve::run(&load()?, raw),
        Commands::Events {
            ref payload,
            ref at,
            ref zone,
        } => commands::events::run(&load()?, payload, at.as_deref(), zone.as_deref()),
        Commands::Find {
            ref payload,
            ref transaction_id,
        } => commands::find::run(&load()?, payload, transaction_id),
        Commands::Config { ref command } => match command {
            ConfigCommands::Init { force } => {
                commands::config::init(*force, cli.zones.as_deref(), cli.all_day_zone.as_deref())
            }
            ConfigCommands::Show => commands::config::show(&load()?),
        },
    }
}
