//! chanwatch — keep access point radio channels on their configured values.
//!
//! # Usage
//!
//! ```text
//! chanwatch run [--log-format text|json] [config flags]
//! chanwatch once [--json] [config flags]
//! chanwatch config check [--json] [config flags]
//! ```
//!
//! Configuration is read from `~/.chanwatch/config.yaml` (or `--config`),
//! then the environment (`SERVER`, `CID`, `CLIENT_ID`, `CLIENT_SECRET`,
//! `SITE_ID`, `APS`, `INTERVAL`, `REQUEST_TIMEOUT`), then flags.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommand, once::OnceArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "chanwatch",
    version,
    about = "Reconcile access point radio channels against controller configuration",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run reconciliation passes forever, one every interval.
    Run(RunArgs),

    /// Run a single pass and print what happened to each access point.
    Once(OnceArgs),

    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Once(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
