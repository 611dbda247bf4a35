use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use chanwatch_core::{Config, ControllerApi, HttpController, SessionError};
use chanwatch_reconcile::{PassReport, Reconciler};

use crate::error::{join_err, DaemonError};

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Counters for a finished scheduler loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Passes started, including aborted ones.
    pub passes: usize,
    /// Passes that stopped at authorization.
    pub aborted_passes: usize,
    /// Device reconciliations that failed across all passes.
    pub device_failures: usize,
}

impl LoopStats {
    fn record(&mut self, outcome: &Result<PassReport, SessionError>) {
        self.passes += 1;
        match outcome {
            Ok(report) => self.device_failures += report.failures().count(),
            Err(_) => self.aborted_passes += 1,
        }
    }
}

/// Start the daemon and block the current thread until it exits.
pub fn start_blocking(config: Config, format: LogFormat) -> Result<(), DaemonError> {
    init_tracing(format);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;
    runtime.block_on(run(config))
}

/// Run the scheduler against the configured controller until ctrl-c.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    let api = Arc::new(HttpController::new(&config));
    let reconciler = Reconciler::new(api, config.identity.clone(), config.aps.clone());

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = tokio::signal::ctrl_c().await.map_err(DaemonError::Signal);
            if result.is_ok() {
                tracing::info!("received ctrl-c, shutting down daemon");
            }
            let _ = shutdown.send(());
            result
        })
    };

    tracing::info!(
        server = %config.server,
        site = %config.site_id,
        aps = config.aps.len(),
        interval_ms = config.interval.as_millis() as u64,
        "channel watch started",
    );

    let stats = run_loop(reconciler, config.interval, shutdown_rx).await?;
    tracing::info!(
        passes = stats.passes,
        aborted = stats.aborted_passes,
        device_failures = stats.device_failures,
        "channel watch stopped",
    );

    signal_handle
        .await
        .map_err(|err| join_err("signal_handler", err))?
}

/// Run passes back to back with `interval` of idle time between them.
///
/// The idle timer only starts once a pass has returned, and the reconciler
/// is moved into the blocking pass and handed back afterwards, so two passes
/// can never share the session. Shutdown during a pass waits for it to end.
pub async fn run_loop<C>(
    mut reconciler: Reconciler<C>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<LoopStats, DaemonError>
where
    C: ControllerApi + Send + Sync + 'static,
{
    let mut stats = LoopStats::default();

    loop {
        let mut pass = tokio::task::spawn_blocking(move || {
            let outcome = reconciler.run_pass();
            (reconciler, outcome)
        });

        let mut stopping = false;
        let joined = tokio::select! {
            joined = &mut pass => joined,
            _ = shutdown_rx.recv() => {
                tracing::info!("shutdown requested, waiting for the running pass");
                stopping = true;
                pass.await
            }
        };
        let (returned, outcome) = joined.map_err(|err| join_err("pass", err))?;
        reconciler = returned;

        stats.record(&outcome);
        log_pass(&outcome);

        if stopping {
            break;
        }

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    Ok(stats)
}

fn log_pass(outcome: &Result<PassReport, SessionError>) {
    match outcome {
        Ok(report) => {
            let summary = report.summary();
            tracing::info!(
                devices = summary.devices,
                in_sync = summary.in_sync,
                corrected = summary.corrected,
                failed = summary.failed,
                duration_ms = summary.duration_ms as u64,
                "pass completed",
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "pass aborted, retrying after the interval");
        }
    }
}

/// Install the global subscriber on stderr. `RUST_LOG` overrides the `info`
/// default.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
