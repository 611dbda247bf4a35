//! Scripted in-memory controller shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chanwatch_core::{
    AccessToken, ApiError, ChannelTable, ClientIdentity, ControllerApi, MacAddress,
    RadioConfigDocument, RadioStatus, TokenPair,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authorize,
    Renew { refresh_token: String },
    Radios(String),
    RadioConfig(String),
    AvailableChannels(String),
    Patch { mac: String, body: String },
}

/// How a scripted endpoint fails.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16),
    Code(i64),
}

impl Failure {
    fn to_error(self) -> ApiError {
        match self {
            Failure::Status(status) => ApiError::Status {
                status,
                status_text: "scripted".to_string(),
            },
            Failure::Code(code) => ApiError::Application {
                code,
                message: format!("scripted error {code}"),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeAp {
    pub actual_channel: String,
    pub config_json: String,
    pub channels: Vec<(String, String)>,
    pub fail_radios: Option<Failure>,
    pub fail_config: Option<Failure>,
    pub fail_channels: Option<Failure>,
    pub fail_patch: Option<Failure>,
}

impl FakeAp {
    /// `actual` is the raw `actualChannel` field, `index` the configured
    /// channel index, `channels` the `(index, channel)` enumeration.
    pub fn new(actual: &str, index: u32, channels: &[(u32, &str)]) -> Self {
        Self {
            actual_channel: actual.to_string(),
            config_json: format!(
                r#"{{"radioSetting5g": {{"radioEnable": true, "channel": {index}, "channelWidth": "2"}}, "radioSetting2g": {{"channel": 0}}}}"#
            ),
            channels: channels
                .iter()
                .map(|(i, c)| (i.to_string(), c.to_string()))
                .collect(),
            fail_radios: None,
            fail_config: None,
            fail_channels: None,
            fail_patch: None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    aps: HashMap<String, FakeAp>,
    authorize_failures: Vec<Failure>,
    renew_failures: Vec<Failure>,
    issued: u32,
    calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct FakeController {
    state: Mutex<State>,
}

impl FakeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ap(self, mac: &str, ap: FakeAp) -> Self {
        self.state
            .lock()
            .expect("lock")
            .aps
            .insert(mac.to_string(), ap);
        self
    }

    /// Queue failures for the next authorize calls; later calls succeed.
    pub fn failing_authorize(self, failures: &[Failure]) -> Self {
        self.state
            .lock()
            .expect("lock")
            .authorize_failures
            .extend(failures.iter().copied());
        self
    }

    pub fn failing_renew(self, failures: &[Failure]) -> Self {
        self.state
            .lock()
            .expect("lock")
            .renew_failures
            .extend(failures.iter().copied());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("lock").calls.clone()
    }

    pub fn patches(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Patch { mac, body } => Some((mac, body)),
                _ => None,
            })
            .collect()
    }

    pub fn config_json(&self, mac: &str) -> String {
        self.state.lock().expect("lock").aps[mac].config_json.clone()
    }

    fn issue(state: &mut State) -> TokenPair {
        state.issued += 1;
        TokenPair {
            access_token: AccessToken(format!("AT-{}", state.issued)),
            refresh_token: format!("RT-{}", state.issued),
        }
    }

    fn ap(state: &State, mac: &MacAddress) -> Result<FakeAp, ApiError> {
        state
            .aps
            .get(mac.as_str())
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                status_text: "Not Found".to_string(),
            })
    }
}

impl ControllerApi for FakeController {
    fn authorize(&self, _identity: &ClientIdentity) -> Result<TokenPair, ApiError> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::Authorize);
        if !state.authorize_failures.is_empty() {
            return Err(state.authorize_failures.remove(0).to_error());
        }
        Ok(Self::issue(&mut state))
    }

    fn renew(&self, _identity: &ClientIdentity, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::Renew {
            refresh_token: refresh_token.to_string(),
        });
        if !state.renew_failures.is_empty() {
            return Err(state.renew_failures.remove(0).to_error());
        }
        Ok(Self::issue(&mut state))
    }

    fn radios(&self, _token: &AccessToken, mac: &MacAddress) -> Result<RadioStatus, ApiError> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::Radios(mac.to_string()));
        let ap = Self::ap(&state, mac)?;
        if let Some(failure) = ap.fail_radios {
            return Err(failure.to_error());
        }
        Ok(RadioStatus {
            actual_channel: ap.actual_channel,
        })
    }

    fn radio_config(
        &self,
        _token: &AccessToken,
        mac: &MacAddress,
    ) -> Result<RadioConfigDocument, ApiError> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::RadioConfig(mac.to_string()));
        let ap = Self::ap(&state, mac)?;
        if let Some(failure) = ap.fail_config {
            return Err(failure.to_error());
        }
        RadioConfigDocument::from_json(ap.config_json)
    }

    fn available_channels(
        &self,
        _token: &AccessToken,
        mac: &MacAddress,
    ) -> Result<ChannelTable, ApiError> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::AvailableChannels(mac.to_string()));
        let ap = Self::ap(&state, mac)?;
        if let Some(failure) = ap.fail_channels {
            return Err(failure.to_error());
        }
        Ok(ap.channels.into_iter().collect())
    }

    fn update_radio_config(
        &self,
        _token: &AccessToken,
        mac: &MacAddress,
        document: &RadioConfigDocument,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().expect("lock");
        state.calls.push(Call::Patch {
            mac: mac.to_string(),
            body: document.as_json().to_string(),
        });
        let ap = Self::ap(&state, mac)?;
        match ap.fail_patch {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

pub fn identity() -> ClientIdentity {
    ClientIdentity {
        controller_id: "cid".to_string(),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
    }
}

pub fn mac(s: &str) -> MacAddress {
    MacAddress::parse(s).expect("mac")
}
