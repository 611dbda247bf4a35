//! Error types for chanwatch-reconcile.

use std::fmt;

use thiserror::Error;

use chanwatch_core::{ApiError, FailureKind};

/// Which controller call a reconciliation was on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStep {
    FetchRadios,
    FetchRadioConfig,
    FetchAvailableChannels,
    UpdateRadioConfig,
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReconcileStep::FetchRadios => "failed to fetch AP data",
            ReconcileStep::FetchRadioConfig => "failed to fetch AP config",
            ReconcileStep::FetchAvailableChannels => "failed to fetch available channels",
            ReconcileStep::UpdateRadioConfig => "failed to update AP config",
        };
        f.write_str(text)
    }
}

/// Classification used in pass reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Api,
    Consistency,
}

/// Failure reconciling a single device.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A controller request failed.
    #[error("{step}: {source}")]
    Request {
        step: ReconcileStep,
        #[source]
        source: ApiError,
    },

    /// The configured index is not in the controller's own channel list.
    #[error("configured channel index {index} not found in available channels")]
    ChannelIndexNotFound { index: String },

    /// `actualChannel` held no channel token.
    #[error("AP reported an empty actual channel")]
    MissingActualChannel,
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Request { source, .. } => match source.kind() {
                FailureKind::Transport => ErrorKind::Transport,
                FailureKind::Api => ErrorKind::Api,
            },
            ReconcileError::MissingActualChannel => ErrorKind::Api,
            ReconcileError::ChannelIndexNotFound { .. } => ErrorKind::Consistency,
        }
    }

    pub(crate) fn at(step: ReconcileStep) -> impl FnOnce(ApiError) -> ReconcileError {
        move |source| ReconcileError::Request { step, source }
    }
}
