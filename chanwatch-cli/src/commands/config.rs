//! `chanwatch config` — inspect the merged configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use chanwatch_core::Config;

use super::ConfigArgs;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration and print it with the secret redacted.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ConfigView<'a> {
    server: &'a str,
    cid: &'a str,
    client_id: &'a str,
    client_secret: &'static str,
    site_id: &'a str,
    aps: Vec<&'a str>,
    interval_ms: u128,
    request_timeout_ms: u128,
}

impl<'a> From<&'a Config> for ConfigView<'a> {
    fn from(config: &'a Config) -> Self {
        Self {
            server: &config.server,
            cid: &config.identity.controller_id,
            client_id: &config.identity.client_id,
            client_secret: "<redacted>",
            site_id: &config.site_id,
            aps: config.aps.iter().map(|mac| mac.as_str()).collect(),
            interval_ms: config.interval.as_millis(),
            request_timeout_ms: config.request_timeout.as_millis(),
        }
    }
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Check(args) => {
            let config = args.config.resolve().context("invalid configuration")?;
            let view = ConfigView::from(&config);
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&view)
                        .context("failed to render config JSON")?
                );
            } else {
                println!("server:          {}", view.server);
                println!("controller id:   {}", view.cid);
                println!("client id:       {}", view.client_id);
                println!("client secret:   {}", view.client_secret);
                println!("site id:         {}", view.site_id);
                println!("access points:   {}", view.aps.join(", "));
                println!("interval:        {} ms", view.interval_ms);
                println!("request timeout: {} ms", view.request_timeout_ms);
            }
        }
    }
    Ok(())
}
