//! Per-device drift detection and correction.
//!
//! ## `reconcile` — read, compare, correct
//!
//! 1. Read live radio state; the first token of `actualChannel` is the channel.
//! 2. Read the persisted radio config and keep the whole document.
//! 3. Read the channel enumeration and resolve the configured index.
//! 4. If the channels differ, PATCH the unchanged document back.
//!
//! Any failure before step 4 returns early, so a write only ever follows
//! three successful reads.

use serde::Serialize;

use chanwatch_core::{AccessToken, ControllerApi, MacAddress};

use crate::error::{ReconcileError, ReconcileStep};

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Actual and desired channel agree; nothing was written.
    InSync { channel: String },
    /// The AP had drifted and the config was resent.
    Corrected { actual: String, desired: String },
}

/// Reconcile one access point.
pub fn reconcile<C>(
    api: &C,
    token: &AccessToken,
    mac: &MacAddress,
) -> Result<ReconcileOutcome, ReconcileError>
where
    C: ControllerApi + ?Sized,
{
    let radios = api
        .radios(token, mac)
        .map_err(ReconcileError::at(ReconcileStep::FetchRadios))?;
    let actual = radios
        .channel()
        .ok_or(ReconcileError::MissingActualChannel)?
        .to_string();

    let document = api
        .radio_config(token, mac)
        .map_err(ReconcileError::at(ReconcileStep::FetchRadioConfig))?;

    let table = api
        .available_channels(token, mac)
        .map_err(ReconcileError::at(ReconcileStep::FetchAvailableChannels))?;
    let desired = table
        .resolve(document.desired_channel_index())
        .ok_or_else(|| ReconcileError::ChannelIndexNotFound {
            index: document.desired_channel_index().to_string(),
        })?
        .to_string();

    if actual == desired {
        tracing::debug!(mac = %mac, channel = %actual, "AP on configured channel");
        return Ok(ReconcileOutcome::InSync { channel: actual });
    }

    tracing::warn!(
        mac = %mac,
        actual = %actual,
        desired = %desired,
        "AP is on channel {actual} but should be on {desired}; updating",
    );
    api.update_radio_config(token, mac, &document)
        .map_err(ReconcileError::at(ReconcileStep::UpdateRadioConfig))?;
    tracing::info!(mac = %mac, channel = %desired, "AP channel updated");

    Ok(ReconcileOutcome::Corrected { actual, desired })
}
