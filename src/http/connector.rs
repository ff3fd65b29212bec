use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{AppError, TransportError};

use super::{EncodedBody, Outcome, Query, Request, RequestEcho, Response};

/// Deadline applied when a room does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_USER_AGENT: &str = concat!("elevator/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct ConnectorBuilder {
    base_url: Url,
    timeout: Duration,
    default_headers: HeaderMap,
}

impl ConnectorBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            default_headers: HeaderMap::new(),
        }
    }

    /// A zero timeout keeps the default.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<Connector, reqwest::Error> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Connector {
            client,
            base_url: directory_url(self.base_url),
            default_headers: self.default_headers,
            timeout: self.timeout,
        })
    }
}

/// Transport binding shared by every request of one room.
///
/// Immutable once built; per-call credentials are layered on a fresh header
/// snapshot so concurrent sends never observe each other's headers.
#[derive(Debug, Clone)]
pub struct Connector {
    client: Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl Connector {
    #[must_use]
    pub fn builder(base_url: Url) -> ConnectorBuilder {
        ConnectorBuilder::new(base_url)
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one request and normalizes whatever comes back.
    ///
    /// Never fails outright: transport problems produce a status-0 response
    /// paired with the error.
    pub async fn dispatch(&self, request: &Request, credentials: &HeaderMap) -> Outcome {
        let started = Instant::now();
        let mut headers = self.merge_headers(request.headers(), credentials);

        let url = match self.resolve_url(request.path(), request.query()) {
            Ok(url) => url,
            Err(err) => {
                let echo = unsent(request, self.base_url.as_str(), headers);
                return fail(echo, err, started);
            }
        };

        let encoded = match request.body().encode() {
            Ok(encoded) => encoded,
            Err(err) => return fail(unsent(request, url.as_str(), headers), err, started),
        };

        let mut builder = self
            .client
            .request(request.method().to_reqwest(), url.clone())
            .timeout(self.timeout);
        builder = match encoded {
            EncodedBody::Empty => builder.headers(headers),
            EncodedBody::Bytes {
                bytes,
                content_type,
            } => {
                if let Some(content_type) = content_type.as_deref()
                    && let Ok(value) = HeaderValue::from_str(content_type)
                {
                    headers.insert(CONTENT_TYPE, value);
                }
                builder.headers(headers).body(bytes)
            }
            EncodedBody::Multipart(form) => {
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(form)
            }
        };

        let wire = match builder.build() {
            Ok(wire) => wire,
            Err(err) => {
                let echo = unsent(request, url.as_str(), HeaderMap::new());
                return fail(
                    echo,
                    TransportError::BuildRequest {
                        url: url.to_string(),
                        source: err,
                    },
                    started,
                );
            }
        };
        let echo = RequestEcho {
            method: request.method(),
            url: wire.url().to_string(),
            headers: wire.headers().clone(),
            body: wire
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(Bytes::copy_from_slice)
                .unwrap_or_default(),
        };

        debug!("{} {}", echo.method, echo.url);
        let response = match self.client.execute(wire).await {
            Ok(response) => response,
            Err(err) => {
                let error = TransportError::from_send(url.as_str(), err);
                return fail(echo, error, started);
            }
        };

        let status = response.status().as_u16();
        let response_headers = response.headers().clone();
        match response.bytes().await {
            Ok(body) => {
                debug!("{} {} -> {}", echo.method, echo.url, status);
                Outcome::delivered(Response::received(
                    status,
                    response_headers,
                    body,
                    echo,
                    started.elapsed(),
                    request.dto(),
                ))
            }
            Err(err) => fail(
                echo,
                TransportError::ReadBody {
                    url: url.to_string(),
                    source: err,
                },
                started,
            ),
        }
    }

    /// Room defaults, then request headers, then credentials; each layer
    /// replaces every value of the names it sets.
    pub(crate) fn merge_headers(&self, request: &HeaderMap, credentials: &HeaderMap) -> HeaderMap {
        let mut merged = self.default_headers.clone();
        overlay(&mut merged, request);
        overlay(&mut merged, credentials);
        merged
    }

    pub(crate) fn resolve_url(&self, path: &str, query: &Query) -> Result<Url, TransportError> {
        let relative = path.trim_start_matches('/');
        let mut url = self
            .base_url
            .join(relative)
            .map_err(|err| TransportError::InvalidPath {
                path: path.to_owned(),
                source: err,
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs().iter());
        }
        Ok(url)
    }
}

/// Echo for a request that never reached the wire.
fn unsent(request: &Request, url: &str, headers: HeaderMap) -> RequestEcho {
    RequestEcho {
        method: request.method(),
        url: url.to_owned(),
        headers,
        body: Bytes::new(),
    }
}

fn fail(echo: RequestEcho, error: TransportError, started: Instant) -> Outcome {
    warn!("{} {} failed: {}", echo.method, echo.url, error);
    let error = AppError::from(error);
    let response = Response::failed(echo, &error, started.elapsed());
    Outcome::failed(response, error)
}

fn overlay(target: &mut HeaderMap, layer: &HeaderMap) {
    for name in layer.keys() {
        target.remove(name);
    }
    for (name, value) in layer {
        target.append(name.clone(), value.clone());
    }
}

/// Paths join relative to the base, so the base path must end in `/`.
fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
