use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{AuthConfig, RequestConfig, RoomConfig};
use crate::error::ConfigError;
use crate::http::{BodyKind, Connector, DEFAULT_TIMEOUT, Query, Request, value_to_text};
use crate::room::{BearerTokenAuth, Room};

use super::template::BodyTemplate;

const AUTH_REQUEST: &str = "auth";

pub(crate) struct WarmRoom {
    pub(crate) room: Room,
    pub(crate) templates: BTreeMap<String, BodyTemplate>,
}

pub(crate) fn build_room(key: &str, config: &RoomConfig) -> Result<WarmRoom, ConfigError> {
    let connection = &config.connection;
    let base_url =
        Url::parse(connection.base_url.trim()).map_err(|err| ConfigError::InvalidBaseUrl {
            room: key.to_owned(),
            url: connection.base_url.clone(),
            source: err,
        })?;
    let timeout = connection
        .timeout
        .filter(|seconds| *seconds > 0)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    let connector = Connector::builder(base_url)
        .timeout(timeout)
        .default_headers(header_map(key, &connection.headers)?)
        .build()
        .map_err(|err| ConfigError::BuildClient {
            room: key.to_owned(),
            source: err,
        })?;

    let mut room = Room::new(connector);
    if let Some(auth) = connection.auth.as_ref()
        && let Some(strategy) = bearer_strategy(key, auth)?
    {
        room = room.with_auth(strategy);
    }

    let mut templates = BTreeMap::new();
    for (request_key, request_config) in &config.requests {
        let (request, template) = build_request(key, request_key, request_config)?;
        room.insert_request(request_key.clone(), request);
        templates.insert(request_key.clone(), template);
    }

    debug!(
        "Warmed room '{}' with {} request(s), auth: {}",
        key,
        templates.len(),
        room.auth().is_some()
    );
    Ok(WarmRoom { room, templates })
}

fn bearer_strategy(room: &str, auth: &AuthConfig) -> Result<Option<BearerTokenAuth>, ConfigError> {
    if auth.is_disabled() {
        return Ok(None);
    }
    if !auth.is_bearer() {
        return Err(ConfigError::UnsupportedAuthType {
            room: room.to_owned(),
            kind: auth.kind.clone().unwrap_or_default(),
        });
    }
    let token_key = auth
        .access_token_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ConfigError::MissingAccessTokenKey {
            room: room.to_owned(),
        })?;
    let request_config = auth
        .request
        .as_ref()
        .ok_or_else(|| ConfigError::MissingAuthRequest {
            room: room.to_owned(),
        })?;
    let (pre_request, _template) = build_request(room, AUTH_REQUEST, request_config)?;
    Ok(Some(BearerTokenAuth::new(pre_request, token_key)))
}

pub(crate) fn build_request(
    room: &str,
    key: &str,
    config: &RequestConfig,
) -> Result<(Request, BodyTemplate), ConfigError> {
    let mut request = Request::new(config.path.trim()).with_method(config.method);
    if let Some(tag) = config
        .concurrent_key
        .as_deref()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
    {
        request = request.with_concurrency_tag(tag);
    }
    *request.headers_mut() = header_map(room, &config.headers)?;
    if !config.query.is_empty() {
        request.set_query(
            config
                .query
                .iter()
                .map(|(key, value)| (key.clone(), value_to_text(value)))
                .collect::<Query>(),
        );
    }

    let Some(body) = config.body.as_ref() else {
        return Ok((request, BodyTemplate::default()));
    };
    let kind = body_kind(room, key, body.kind.as_deref())?;
    if let Some(kind) = kind {
        request.set_body(kind.encoder(&body.content)?);
    }
    Ok((request, BodyTemplate::new(kind, body.dynamic_content.clone())))
}

/// `None` for an absent or blank type: such a request sends no body.
fn body_kind(
    room: &str,
    request: &str,
    kind: Option<&str>,
) -> Result<Option<BodyKind>, ConfigError> {
    let Some(name) = kind.map(str::trim).filter(|name| !name.is_empty()) else {
        return Ok(None);
    };
    BodyKind::from_name(name)
        .map(Some)
        .ok_or_else(|| ConfigError::UnsupportedBodyType {
            room: room.to_owned(),
            request: request.to_owned(),
            kind: name.to_owned(),
        })
}

pub(crate) fn header_map(
    room: &str,
    headers: &BTreeMap<String, Value>,
) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let (header_name, header_value) = header_pair(name, &value_to_text(value))
            .ok_or_else(|| ConfigError::InvalidHeader {
                room: room.to_owned(),
                name: name.clone(),
            })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

pub(crate) fn header_pair(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.trim().as_bytes()).ok()?;
    let value = HeaderValue::from_str(value).ok()?;
    Some((name, value))
}
