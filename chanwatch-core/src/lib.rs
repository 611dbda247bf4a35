//! chanwatch core library — domain types, configuration, controller client,
//! and the access-token session.
//!
//! - [`types`] — MAC addresses, tokens, radio observations
//! - [`error`] — [`ApiError`], [`AuthFailure`], [`SessionError`], [`ConfigError`]
//! - [`config`] — layered configuration and validation
//! - [`controller`] — [`ControllerApi`] and the `ureq`-backed [`HttpController`]
//! - [`session`] — [`SessionManager`]

pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod types;

pub use config::{Config, RawConfig};
pub use controller::{ControllerApi, HttpController};
pub use error::{ApiError, AuthFailure, ConfigError, FailureKind, SessionError};
pub use session::SessionManager;
pub use types::{
    AccessToken, ChannelTable, ClientIdentity, MacAddress, RadioConfigDocument, RadioStatus,
    Session, SessionState, TokenPair,
};
