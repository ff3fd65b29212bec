use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpMethod;

/// Root of an integration file: rooms keyed by room id.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ElevatorConfig {
    #[serde(default)]
    pub rooms: BTreeMap<String, RoomConfig>,
}

impl ElevatorConfig {
    #[must_use]
    pub fn request(&self, room: &str, request: &str) -> Option<&RequestConfig> {
        self.rooms
            .get(room)
            .and_then(|entry| entry.requests.get(request))
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct RoomConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub requests: BTreeMap<String, RequestConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default)]
    pub base_url: String,
    /// Seconds; absent or zero means the default deadline.
    #[serde(default, alias = "timeoutSeconds")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub access_token_key: Option<String>,
    #[serde(default)]
    pub request: Option<RequestConfig>,
}

impl AuthConfig {
    /// `true` for `type: bearer`, case-insensitive.
    #[must_use]
    pub fn is_bearer(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("bearer"))
    }

    /// `true` when no auth type is set, or it is `none`.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.kind
            .as_deref()
            .map(str::trim)
            .is_none_or(|kind| kind.is_empty() || kind.eq_ignore_ascii_case("none"))
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    #[serde(default, alias = "concurrencyTag")]
    pub concurrent_key: Option<String>,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    #[serde(default)]
    pub query: BTreeMap<String, Value>,
    #[serde(default)]
    pub body: Option<BodyConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyConfig {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub dynamic_content: Vec<DynamicContent>,
}

/// One template field: resolved from the call payload unless `value` is set.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct DynamicContent {
    pub key: String,
    #[serde(default)]
    pub value: Option<Value>,
}
