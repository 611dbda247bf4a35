//! Process configuration: YAML file, environment, then validation.
//!
//! Layers are merged with [`RawConfig::overlay`] (later layer wins) and
//! turned into a [`Config`] by [`RawConfig::validate`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{ClientIdentity, MacAddress};

pub const DEFAULT_SERVER: &str = "https://localhost:8043";
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100_000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const CONFIG_DIR: &str = ".chanwatch";
pub const CONFIG_FILE: &str = "config.yaml";

/// Validated configuration for one daemon process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Controller base URL without a trailing slash.
    pub server: String,
    pub identity: ClientIdentity,
    pub site_id: String,
    /// Fleet, in the order devices are visited each pass.
    pub aps: Vec<MacAddress>,
    pub interval: Duration,
    pub request_timeout: Duration,
}

/// One unvalidated configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub server: Option<String>,
    pub cid: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub site_id: Option<String>,
    pub aps: Option<Vec<String>>,
    pub interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

impl RawConfig {
    /// Read a YAML config file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the process environment (`SERVER`, `CID`, `CLIENT_ID`,
    /// `CLIENT_SECRET`, `SITE_ID`, `APS`, `INTERVAL`, `REQUEST_TIMEOUT`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RawConfig::from_env`] over an arbitrary lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Ok(Self {
            server: get("SERVER"),
            cid: get("CID"),
            client_id: get("CLIENT_ID"),
            client_secret: get("CLIENT_SECRET"),
            site_id: get("SITE_ID"),
            aps: get("APS").map(|list| split_list(&list)),
            interval_ms: get("INTERVAL")
                .map(|v| parse_millis("INTERVAL", &v))
                .transpose()?,
            request_timeout_ms: get("REQUEST_TIMEOUT")
                .map(|v| parse_millis("REQUEST_TIMEOUT", &v))
                .transpose()?,
        })
    }

    /// Fields set in `top` replace the ones in `self`.
    pub fn overlay(self, top: RawConfig) -> RawConfig {
        RawConfig {
            server: top.server.or(self.server),
            cid: top.cid.or(self.cid),
            client_id: top.client_id.or(self.client_id),
            client_secret: top.client_secret.or(self.client_secret),
            site_id: top.site_id.or(self.site_id),
            aps: top.aps.or(self.aps),
            interval_ms: top.interval_ms.or(self.interval_ms),
            request_timeout_ms: top.request_timeout_ms.or(self.request_timeout_ms),
        }
    }

    pub fn validate(self) -> Result<Config, ConfigError> {
        let controller_id = require(self.cid, "CID")?;
        let client_id = require(self.client_id, "CLIENT_ID")?;
        let client_secret = require(self.client_secret, "CLIENT_SECRET")?;
        let site_id = require(self.site_id, "SITE_ID")?;

        let raw_aps = self.aps.ok_or(ConfigError::Missing { key: "APS" })?;
        let aps = raw_aps
            .iter()
            .map(|s| MacAddress::parse(s.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        if aps.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }

        let interval = positive_millis("INTERVAL", self.interval_ms)?.unwrap_or(DEFAULT_INTERVAL);
        let request_timeout = positive_millis("REQUEST_TIMEOUT", self.request_timeout_ms)?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let server = self
            .server
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        Ok(Config {
            server,
            identity: ClientIdentity {
                controller_id,
                client_id,
                client_secret,
            },
            site_id,
            aps,
            interval,
            request_timeout,
        })
    }
}

/// `~/.chanwatch/config.yaml`, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| config_path_at(&home))
}

pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

fn require(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing { key })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

fn parse_millis(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        })
}

fn positive_millis(key: &'static str, value: Option<u64>) -> Result<Option<Duration>, ConfigError> {
    match value {
        None => Ok(None),
        Some(0) => Err(ConfigError::InvalidNumber {
            key,
            value: "0".to_string(),
        }),
        Some(ms) => Ok(Some(Duration::from_millis(ms))),
    }
}
