//! Controller API: the trait the reconciler talks to and its HTTP client.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::ApiError;
use crate::types::{
    canonical_scalar, AccessToken, ChannelTable, ClientIdentity, MacAddress, RadioConfigDocument,
    RadioStatus, TokenPair,
};

/// Operations the daemon needs from the controller. One method per endpoint.
pub trait ControllerApi {
    /// Full `client_credentials` authorization.
    fn authorize(&self, identity: &ClientIdentity) -> Result<TokenPair, ApiError>;

    /// Exchange a refresh token for a new token pair.
    fn renew(&self, identity: &ClientIdentity, refresh_token: &str)
        -> Result<TokenPair, ApiError>;

    fn radios(&self, token: &AccessToken, mac: &MacAddress) -> Result<RadioStatus, ApiError>;

    fn radio_config(
        &self,
        token: &AccessToken,
        mac: &MacAddress,
    ) -> Result<RadioConfigDocument, ApiError>;

    fn available_channels(
        &self,
        token: &AccessToken,
        mac: &MacAddress,
    ) -> Result<ChannelTable, ApiError>;

    /// PATCH the radio config with `document` exactly as it was read.
    fn update_radio_config(
        &self,
        token: &AccessToken,
        mac: &MacAddress,
        document: &RadioConfigDocument,
    ) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// `{errorCode, msg?, result?}` with `result` left undecoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    error_code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    result: Option<Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResult {
    access_token: String,
    refresh_token: String,
}

/// Check `errorCode` and hand back the raw `result`, if any.
fn open_envelope(body: &str) -> Result<Option<Box<RawValue>>, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|err| ApiError::MalformedResponse(format!("invalid response envelope: {err}")))?;
    if envelope.error_code != 0 {
        return Err(ApiError::Application {
            code: envelope.error_code,
            message: envelope
                .msg
                .unwrap_or_else(|| "no message from controller".to_string()),
        });
    }
    Ok(envelope.result)
}

fn required_result(body: &str) -> Result<Box<RawValue>, ApiError> {
    open_envelope(body)?
        .ok_or_else(|| ApiError::MalformedResponse("response has no result".to_string()))
}

fn decode_result<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let raw = required_result(body)?;
    serde_json::from_str(raw.get())
        .map_err(|err| ApiError::MalformedResponse(format!("unexpected result shape: {err}")))
}

fn decode_tokens(body: &str) -> Result<TokenPair, ApiError> {
    let tokens: TokenResult = decode_result(body)?;
    if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
        return Err(ApiError::MalformedResponse(
            "controller issued an empty token".to_string(),
        ));
    }
    Ok(TokenPair {
        access_token: AccessToken(tokens.access_token),
        refresh_token: tokens.refresh_token,
    })
}

fn decode_radio_status(body: &str) -> Result<RadioStatus, ApiError> {
    let result: Value = decode_result(body)?;
    let actual_channel = result
        .pointer("/wp5g/actualChannel")
        .and_then(canonical_scalar)
        .ok_or_else(|| {
            ApiError::MalformedResponse("radios result has no wp5g.actualChannel".to_string())
        })?;
    Ok(RadioStatus { actual_channel })
}

fn decode_channel_table(body: &str) -> Result<ChannelTable, ApiError> {
    let result: Value = decode_result(body)?;
    let list = result
        .pointer("/1/apChannelDetailList")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ApiError::MalformedResponse(
                "available channels result has no [1].apChannelDetailList".to_string(),
            )
        })?;

    list.iter()
        .map(|entry| {
            let index = entry.get("index").and_then(canonical_scalar);
            let channel = entry.get("channel").and_then(canonical_scalar);
            match (index, channel) {
                (Some(index), Some(channel)) => Ok((index, channel)),
                _ => Err(ApiError::MalformedResponse(format!(
                    "channel entry without index/channel: {entry}"
                ))),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking `ureq` client bound to one controller, tenant and site.
#[derive(Debug, Clone)]
pub struct HttpController {
    agent: ureq::Agent,
    server: String,
    controller_id: String,
    site_id: String,
}

impl HttpController {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .build();
        Self {
            agent,
            server: config.server.clone(),
            controller_id: config.identity.controller_id.clone(),
            site_id: config.site_id.clone(),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/openapi/authorize/token", self.server)
    }

    fn ap_url(&self, mac: &MacAddress, leaf: &str) -> String {
        format!(
            "{}/openapi/v1/{}/sites/{}/aps/{}/{}",
            self.server, self.controller_id, self.site_id, mac, leaf
        )
    }

    fn authed(&self, method: &str, url: &str, token: &AccessToken) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &token.header_value())
    }

    /// Send the request and return the body of a 2xx response.
    fn execute(&self, request: ureq::Request, body: Option<&str>) -> Result<String, ApiError> {
        tracing::debug!(method = request.method(), path = %request_path(&request), "controller request");
        let request = request.set("Content-Type", "application/json");
        let sent = match body {
            Some(body) => request.send_string(body),
            None => request.call(),
        };
        match sent {
            Ok(response) => response
                .into_string()
                .map_err(|err| ApiError::Transport(format!("failed to read body: {err}"))),
            Err(ureq::Error::Status(status, response)) => Err(ApiError::Status {
                status,
                status_text: response.status_text().to_string(),
            }),
            Err(ureq::Error::Transport(err)) => Err(ApiError::Transport(err.to_string())),
        }
    }
}

/// URL path without the query string, which may carry secrets.
fn request_path(request: &ureq::Request) -> String {
    let url = request.url();
    url.split('?').next().unwrap_or(url).to_string()
}

impl ControllerApi for HttpController {
    fn authorize(&self, identity: &ClientIdentity) -> Result<TokenPair, ApiError> {
        let request = self
            .agent
            .post(&self.token_url())
            .query("grant_type", "client_credentials");
        let body = json!({
            "omadacId": identity.controller_id,
            "client_id": identity.client_id,
            "client_secret": identity.client_secret,
        });
        let response = self.execute(request, Some(&body.to_string()))?;
        decode_tokens(&response)
    }

    fn renew(
        &self,
        identity: &ClientIdentity,
        refresh_token: &str,
    ) -> Result<TokenPair, ApiError> {
        let request = self
            .agent
            .post(&self.token_url())
            .query("grant_type", "refresh_token")
            .query("client_id", &identity.client_id)
            .query("client_secret", &identity.client_secret)
            .query("refresh_token", refresh_token);
        let response = self.execute(request, None)?;
        decode_tokens(&response)
    }

    fn radios(&self, token: &AccessToken, mac: &MacAddress) -> Result<RadioStatus, ApiError> {
        let request = self.authed("GET", &self.ap_url(mac, "radios"), token);
        let response = self.execute(request, None)?;
        decode_radio_status(&response)
    }

    fn radio_config(
        &self,
        token: &AccessToken,
        mac: &MacAddress,
    ) -> Result<RadioConfigDocument, ApiError> {
        let request = self.authed("GET", &self.ap_url(mac, "radio-config"), token);
        let response = self.execute(request, None)?;
        RadioConfigDocument::from_raw(required_result(&response)?)
    }

    fn available_channels(
        &self,
        token: &AccessToken,
        mac: &MacAddress,
    ) -> Result<ChannelTable, ApiError> {
        let request = self.authed("GET", &self.ap_url(mac, "available-channel"), token);
        let response = self.execute(request, None)?;
        decode_channel_table(&response)
    }

    fn update_radio_config(
        &self,
        token: &AccessToken,
        mac: &MacAddress,
        document: &RadioConfigDocument,
    ) -> Result<(), ApiError> {
        let request = self.authed("PATCH", &self.ap_url(mac, "radio-config"), token);
        let response = self.execute(request, Some(document.as_json()))?;
        open_envelope(&response).map(|_| ())
    }
}
