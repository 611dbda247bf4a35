pub mod config;
pub mod once;
pub mod run;

use std::path::PathBuf;

use clap::Args;

use chanwatch_core::config::default_config_path;
use chanwatch_core::{Config, ConfigError, RawConfig};

/// Flags shared by every command that needs a configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML config file (default: ~/.chanwatch/config.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Controller base URL.
    #[arg(long)]
    pub server: Option<String>,

    /// Controller (tenant) id.
    #[arg(long)]
    pub cid: Option<String>,

    /// Open API client id.
    #[arg(long)]
    pub client_id: Option<String>,

    /// Open API client secret.
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Site id the access points belong to.
    #[arg(long)]
    pub site_id: Option<String>,

    /// Comma-separated access point MACs (A1-B2-C3-D4-E5-F6).
    #[arg(long, value_delimiter = ',')]
    pub aps: Option<Vec<String>>,

    /// Idle time between passes, in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

impl ConfigArgs {
    /// Merge file, environment and flags (in that order) and validate.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let file = match &self.config {
            Some(path) => RawConfig::load_file(path)?,
            None => match default_config_path().filter(|path| path.exists()) {
                Some(path) => RawConfig::load_file(&path)?,
                None => RawConfig::default(),
            },
        };
        let env = RawConfig::from_env()?;
        let flags = RawConfig {
            server: self.server.clone(),
            cid: self.cid.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            site_id: self.site_id.clone(),
            aps: self.aps.clone(),
            interval_ms: self.interval_ms,
            request_timeout_ms: None,
        };
        file.overlay(env).overlay(flags).validate()
    }
}
