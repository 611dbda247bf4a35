//! `chanwatch run` — the reconciliation daemon in the foreground.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use chanwatch_daemon::{start_blocking, LogFormat};

use super::ConfigArgs;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Arguments for `chanwatch run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.resolve().context("invalid configuration")?;
        start_blocking(config, self.log_format.into()).context("daemon exited with error")
    }
}
