//! Domain types for controller sessions and radio observations.
//!
//! Tokens never print their contents through `Debug`; everything else is a
//! plain value type.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{ApiError, ConfigError};

// ---------------------------------------------------------------------------
// Device identity
// ---------------------------------------------------------------------------

/// Hardware address of an access point in `XX-XX-XX-XX-XX-XX` form
/// (uppercase hex, hyphen separated), exactly as the controller expects it
/// in URL paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(String);

impl MacAddress {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let candidate = raw.trim();
        if is_hyphenated_mac(candidate) {
            Ok(Self(candidate.to_owned()))
        } else {
            Err(ConfigError::InvalidMac {
                value: candidate.to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_hyphenated_mac(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 17
        && bytes.iter().enumerate().all(|(i, b)| {
            if i % 3 == 2 {
                *b == b'-'
            } else {
                b.is_ascii_digit() || (b'A'..=b'F').contains(b)
            }
        })
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Long-lived client identity used for full authorization.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Controller (tenant) id, sent as `omadacId`.
    pub controller_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("controller_id", &self.controller_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Opaque bearer token sent as `Authorization: AccessToken=<token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn header_value(&self) -> String {
        format!("AccessToken={}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Access and refresh token as issued together by the controller.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &self.access_token)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authorized,
}

/// Credential state. Both tokens live in one `TokenPair`, so they are
/// present or absent together and are always replaced as a unit.
#[derive(Debug, Clone, Default)]
pub struct Session {
    tokens: Option<TokenPair>,
}

impl Session {
    pub fn state(&self) -> SessionState {
        match self.tokens {
            Some(_) => SessionState::Authorized,
            None => SessionState::Unauthenticated,
        }
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.tokens.as_ref().map(|t| &t.access_token)
    }

    pub(crate) fn replace(&mut self, tokens: TokenPair) {
        self.tokens = Some(tokens);
    }

    pub(crate) fn clear(&mut self) {
        self.tokens = None;
    }
}

// ---------------------------------------------------------------------------
// Radio observations
// ---------------------------------------------------------------------------

/// Live radio state of an AP as reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioStatus {
    /// Compound field such as `"44 (20MHz)"`; the first token is the channel.
    pub actual_channel: String,
}

impl RadioStatus {
    /// The channel number the AP is transmitting on, if the field has one.
    pub fn channel(&self) -> Option<&str> {
        self.actual_channel.split_whitespace().next()
    }
}

/// The AP's persisted radio configuration, kept verbatim.
///
/// Corrective writes resend `raw` unchanged; only the desired channel index
/// is extracted for comparison.
#[derive(Debug, Clone)]
pub struct RadioConfigDocument {
    raw: Box<RawValue>,
    desired_channel_index: String,
}

impl RadioConfigDocument {
    /// Extract `radioSetting5g.channel` from a raw `radio-config` result.
    pub fn from_raw(raw: Box<RawValue>) -> Result<Self, ApiError> {
        let parsed: Value = serde_json::from_str(raw.get()).map_err(|err| {
            ApiError::MalformedResponse(format!("radio config is not valid JSON: {err}"))
        })?;
        let desired_channel_index = parsed
            .pointer("/radioSetting5g/channel")
            .and_then(canonical_scalar)
            .ok_or_else(|| {
                ApiError::MalformedResponse(
                    "radio config has no radioSetting5g.channel".to_string(),
                )
            })?;
        Ok(Self {
            raw,
            desired_channel_index,
        })
    }

    /// Build a document from JSON text, kept byte for byte.
    pub fn from_json(text: impl Into<String>) -> Result<Self, ApiError> {
        let raw = RawValue::from_string(text.into()).map_err(|err| {
            ApiError::MalformedResponse(format!("radio config is not valid JSON: {err}"))
        })?;
        Self::from_raw(raw)
    }

    /// Index into the controller's channel enumeration, not a channel number.
    pub fn desired_channel_index(&self) -> &str {
        &self.desired_channel_index
    }

    /// The document exactly as the controller returned it.
    pub fn as_json(&self) -> &str {
        self.raw.get()
    }
}

/// Index → channel number mapping for one AP's band context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelTable {
    entries: BTreeMap<String, String>,
}

impl ChannelTable {
    pub fn resolve(&self, index: &str) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ChannelTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        // Later duplicates win, matching a linear scan that keeps the last hit.
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Canonical string form of a JSON scalar the controller may send either as
/// a number or as a string (`3`, `3.0` and `"3"` compare equal).
pub fn canonical_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", f as i64)
            } else {
                f.to_string()
            }
        }),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mac_accepts_uppercase_hyphenated() {
        let mac = MacAddress::parse("A1-B2-C3-D4-E5-F6").expect("valid");
        assert_eq!(mac.as_str(), "A1-B2-C3-D4-E5-F6");
    }

    #[test]
    fn mac_rejects_other_forms() {
        for raw in [
            "a1-b2-c3-d4-e5-f6",
            "A1:B2:C3:D4:E5:F6",
            "A1-B2-C3-D4-E5",
            "A1-B2-C3-D4-E5-F6-07",
            "G1-B2-C3-D4-E5-F6",
            "",
        ] {
            assert!(MacAddress::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn session_starts_unauthenticated_and_swaps_tokens_together() {
        let mut session = Session::default();
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(session.access_token().is_none());

        session.replace(TokenPair {
            access_token: AccessToken("at-1".into()),
            refresh_token: "rt-1".into(),
        });
        assert_eq!(session.state(), SessionState::Authorized);

        session.clear();
        assert!(session.tokens().is_none());
    }

    #[test]
    fn token_debug_output_is_redacted() {
        let pair = TokenPair {
            access_token: AccessToken("secret-access".into()),
            refresh_token: "secret-refresh".into(),
        };
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
    }

    #[test]
    fn radio_config_keeps_raw_text_and_extracts_index() {
        let text = r#"{"radioSetting5g": {"channel": 3, "txPower": 20},  "extra":[1,2]}"#;
        let raw = RawValue::from_string(text.to_string()).expect("raw");
        let doc = RadioConfigDocument::from_raw(raw).expect("doc");
        assert_eq!(doc.desired_channel_index(), "3");
        assert_eq!(doc.as_json(), text);
    }

    #[test]
    fn radio_config_without_channel_is_malformed() {
        let raw = RawValue::from_string(r#"{"radioSetting2g":{"channel":1}}"#.to_string())
            .expect("raw");
        let err = RadioConfigDocument::from_raw(raw).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)), "got: {err}");
    }

    #[test]
    fn canonical_scalar_normalizes_numbers_and_strings() {
        assert_eq!(canonical_scalar(&json!(44)), Some("44".to_string()));
        assert_eq!(canonical_scalar(&json!("44")), Some("44".to_string()));
        assert_eq!(canonical_scalar(&json!(null)), None);
    }

    #[test]
    fn integral_float_index_matches_integer_channel_key() {
        assert_eq!(canonical_scalar(&json!(3.0)), Some("3".to_string()));
        assert_eq!(canonical_scalar(&json!(2.5)), Some("2.5".to_string()));

        let doc = RadioConfigDocument::from_json(r#"{"radioSetting5g":{"channel":3.0}}"#)
            .expect("document");
        let table: ChannelTable = [("3", "44")].into_iter().collect();
        assert_eq!(table.resolve(doc.desired_channel_index()), Some("44"));
    }

    #[test]
    fn radio_status_channel_is_first_token() {
        let status = RadioStatus {
            actual_channel: "44 (20MHz)".to_string(),
        };
        assert_eq!(status.channel(), Some("44"));

        let blank = RadioStatus {
            actual_channel: "  ".to_string(),
        };
        assert_eq!(blank.channel(), None);
    }

    #[test]
    fn channel_table_resolves_by_index() {
        let table: ChannelTable = [("1", "36"), ("3", "44")].into_iter().collect();
        assert_eq!(table.resolve("3"), Some("44"));
        assert_eq!(table.resolve("9"), None);
        assert_eq!(table.len(), 2);
    }
}
