//! Error types for chanwatch-core.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a controller failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx status or the request never completed.
    Transport,
    /// 2xx with a non-zero `errorCode`, or a body we could not make sense of.
    Api,
}

/// Failure of a single controller request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The controller answered with a non-2xx status.
    #[error("HTTP {status} {status_text}")]
    Status { status: u16, status_text: String },

    /// Connection, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// `errorCode != 0` in an otherwise successful response.
    #[error("API error: {message} (errorCode {code})")]
    Application { code: i64, message: String },

    /// The body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Status { .. } | ApiError::Transport(_) => FailureKind::Transport,
            ApiError::Application { .. } | ApiError::MalformedResponse(_) => FailureKind::Api,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome of a failed `authorize` or `renew` attempt.
#[derive(Debug, Error)]
pub enum AuthFailure {
    /// `renew` was called with no refresh token in hand.
    #[error("no session to renew")]
    NoSession,

    #[error("{0}")]
    Request(#[from] ApiError),
}

impl AuthFailure {
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            AuthFailure::NoSession => None,
            AuthFailure::Request(err) => Some(err.kind()),
        }
    }
}

/// Every authorization path for this pass has been exhausted.
#[derive(Debug, Error)]
pub enum SessionError {
    /// First authorization of the process failed.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(#[source] AuthFailure),

    /// Renewal failed and the fallback full authorization failed too.
    #[error("re-authorization failed: {authorize} (renewal: {renew})")]
    AuthorizationExhausted {
        renew: AuthFailure,
        #[source]
        authorize: AuthFailure,
    },
}

/// Invalid or missing process configuration. These are the only errors that
/// should end the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not set")]
    Missing { key: &'static str },

    #[error("{value} not of form A1-B2-C3-D4-E5-F6")]
    InvalidMac { value: String },

    #[error("access point list is empty")]
    EmptyFleet,

    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
