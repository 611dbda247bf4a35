//! One fleet pass: make sure the session is usable, then reconcile every
//! device in order, keeping each device's outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use chanwatch_core::{ClientIdentity, ControllerApi, MacAddress, SessionError, SessionManager};

use crate::error::ReconcileError;
use crate::reconciler::{reconcile, ReconcileOutcome};

/// Outcome for one device in a pass.
#[derive(Debug)]
pub struct DeviceReport {
    pub mac: MacAddress,
    pub outcome: Result<ReconcileOutcome, ReconcileError>,
}

/// Everything a completed pass did, device by device.
#[derive(Debug)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub devices: Vec<DeviceReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub devices: usize,
    pub in_sync: usize,
    pub corrected: usize,
    pub failed: usize,
}

impl PassReport {
    pub fn summary(&self) -> PassSummary {
        let mut in_sync = 0usize;
        let mut corrected = 0usize;
        let mut failed = 0usize;
        for device in &self.devices {
            match device.outcome {
                Ok(ReconcileOutcome::InSync { .. }) => in_sync += 1,
                Ok(ReconcileOutcome::Corrected { .. }) => corrected += 1,
                Err(_) => failed += 1,
            }
        }
        PassSummary {
            started_at: self.started_at,
            duration_ms: self.duration.as_millis(),
            devices: self.devices.len(),
            in_sync,
            corrected,
            failed,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = (&MacAddress, &ReconcileError)> {
        self.devices
            .iter()
            .filter_map(|d| d.outcome.as_ref().err().map(|err| (&d.mac, err)))
    }
}

/// Owns the controller handle, the session, and the fleet.
///
/// `run_pass` takes `&mut self`, so one value can never run two passes at
/// once; the scheduler moves it between passes instead of sharing it.
#[derive(Debug)]
pub struct Reconciler<C> {
    api: Arc<C>,
    session: SessionManager,
    fleet: Vec<MacAddress>,
}

impl<C: ControllerApi> Reconciler<C> {
    pub fn new(api: Arc<C>, identity: ClientIdentity, fleet: Vec<MacAddress>) -> Self {
        Self {
            api,
            session: SessionManager::new(identity),
            fleet,
        }
    }

    pub fn fleet(&self) -> &[MacAddress] {
        &self.fleet
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Run one pass. A session failure aborts the pass before any device is
    /// touched; device failures are recorded and the pass moves on.
    pub fn run_pass(&mut self) -> Result<PassReport, SessionError> {
        let started_at = Utc::now();
        let started = Instant::now();

        let token = self.session.ensure_authorized(self.api.as_ref())?;

        let mut devices = Vec::with_capacity(self.fleet.len());
        for mac in &self.fleet {
            let outcome = reconcile(self.api.as_ref(), &token, mac);
            if let Err(err) = &outcome {
                tracing::error!(mac = %mac, kind = ?err.kind(), "error checking AP {mac}: {err}");
            }
            devices.push(DeviceReport {
                mac: mac.clone(),
                outcome,
            });
        }

        Ok(PassReport {
            started_at,
            duration: started.elapsed(),
            devices,
        })
    }
}
