//! `chanwatch once` — a single reconciliation pass with a report.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use chanwatch_core::HttpController;
use chanwatch_daemon::{init_tracing, LogFormat};
use chanwatch_reconcile::{
    DeviceReport, ErrorKind, PassReport, PassSummary, ReconcileOutcome, Reconciler,
};

use super::ConfigArgs;

/// Arguments for `chanwatch once`.
#[derive(Args, Debug)]
pub struct OnceArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl OnceArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.resolve().context("invalid configuration")?;
        init_tracing(LogFormat::Text);

        let api = Arc::new(HttpController::new(&config));
        let mut reconciler = Reconciler::new(api, config.identity.clone(), config.aps.clone());
        let report = reconciler
            .run_pass()
            .context("pass aborted before any access point was checked")?;

        if self.json {
            print_json(&report)?;
        } else {
            print_table(&report);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PassReportJson<'a> {
    summary: PassSummary,
    devices: Vec<DeviceJson<'a>>,
}

#[derive(Serialize)]
struct DeviceJson<'a> {
    mac: &'a str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "access point")]
    mac: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_json(report: &PassReport) -> Result<()> {
    let payload = PassReportJson {
        summary: report.summary(),
        devices: report
            .devices
            .iter()
            .map(|device| DeviceJson {
                mac: device.mac.as_str(),
                status: status_key(device),
                detail: detail(device),
                error_kind: device.outcome.as_ref().err().map(|err| kind_key(err.kind())),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize pass JSON")?
    );
    Ok(())
}

fn print_table(report: &PassReport) {
    let summary = report.summary();
    println!(
        "chanwatch v{} | {} access points | {} in sync | {} corrected | {} failed | {} ms",
        env!("CARGO_PKG_VERSION"),
        summary.devices,
        summary.in_sync,
        summary.corrected,
        summary.failed,
        summary.duration_ms,
    );

    let rows: Vec<DeviceRow> = report
        .devices
        .iter()
        .map(|device| DeviceRow {
            mac: device.mac.to_string(),
            status: status_label(device),
            detail: detail(device),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn status_key(device: &DeviceReport) -> &'static str {
    match device.outcome {
        Ok(ReconcileOutcome::InSync { .. }) => "in_sync",
        Ok(ReconcileOutcome::Corrected { .. }) => "corrected",
        Err(_) => "failed",
    }
}

fn status_label(device: &DeviceReport) -> String {
    match device.outcome {
        Ok(ReconcileOutcome::InSync { .. }) => "IN SYNC".green().bold().to_string(),
        Ok(ReconcileOutcome::Corrected { .. }) => "CORRECTED".yellow().bold().to_string(),
        Err(_) => "FAILED".red().bold().to_string(),
    }
}

fn kind_key(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Transport => "transport",
        ErrorKind::Api => "api",
        ErrorKind::Consistency => "consistency",
    }
}

fn detail(device: &DeviceReport) -> String {
    match &device.outcome {
        Ok(ReconcileOutcome::InSync { channel }) => format!("channel {channel}"),
        Ok(ReconcileOutcome::Corrected { actual, desired }) => {
            format!("channel {actual} -> {desired}")
        }
        Err(err) => err.to_string(),
    }
}
