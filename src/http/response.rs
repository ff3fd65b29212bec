use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, AppResult, DecodeError};

use super::{DecodeFormat, DtoShape, HttpMethod};

/// Status recorded when no HTTP response was received at all.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// What was actually put on the wire for a response's request.
#[derive(Debug, Clone)]
pub struct RequestEcho {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Immutable snapshot of one round trip.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
    value: Option<Value>,
    decode_error: Option<DecodeError>,
    dto: Option<Value>,
    request: RequestEcho,
    elapsed: Duration,
}

impl Response {
    pub(crate) fn received(
        status: u16,
        headers: HeaderMap,
        body: Bytes,
        request: RequestEcho,
        elapsed: Duration,
        dto: Option<&dyn DtoShape>,
    ) -> Self {
        let mut response = Self {
            status,
            headers,
            body,
            value: None,
            decode_error: None,
            dto: None,
            request,
            elapsed,
        };
        if response.body.is_empty() {
            return response;
        }
        let decoded = DecodeFormat::from_content_type(response.content_type())
            .decode_value(&response.body);
        let value = match decoded {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(
                    "Response from {} kept raw, decode failed: {}",
                    response.request.url,
                    err
                );
                response.decode_error = Some(err);
                return response;
            }
        };
        if let Some(shape) = dto {
            match shape.shape(&value) {
                Ok(shaped) => response.dto = Some(shaped),
                Err(err) => {
                    tracing::debug!(
                        "Response from {} does not fit {}: {}",
                        response.request.url,
                        shape.target(),
                        err
                    );
                    response.decode_error = Some(err);
                }
            }
        }
        response.value = Some(value);
        response
    }

    /// Response standing in for a round trip that never produced one.
    pub(crate) fn failed(request: RequestEcho, error: &AppError, elapsed: Duration) -> Self {
        let value = serde_json::json!({ "runtime_error": error.to_string() });
        let body = Bytes::from(value.to_string());
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            headers: HeaderMap::new(),
            body,
            value: Some(value),
            decode_error: None,
            dto: None,
            request,
            elapsed,
        }
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// `true` for statuses in 200..=299.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body decoded as a generic value, if decoding succeeded.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub const fn decode_error(&self) -> Option<&DecodeError> {
        self.decode_error.as_ref()
    }

    /// Value after passing through the request's DTO shape, if one was set.
    #[must_use]
    pub const fn dto_value(&self) -> Option<&Value> {
        self.dto.as_ref()
    }

    /// Decodes the raw body into `T` using the response content type.
    ///
    /// # Errors
    ///
    /// Returns an error when the body does not decode into `T`.
    pub fn dto<T>(&self) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        DecodeFormat::from_content_type(self.content_type()).decode(&self.body)
    }

    #[must_use]
    pub const fn request(&self) -> &RequestEcho {
        &self.request
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// A response paired with the runtime failure that produced it, if any.
///
/// Transport and auth failures never replace the response: the caller can
/// always inspect what came back (or the synthetic status-0 stand-in).
#[derive(Debug)]
pub struct Outcome {
    pub response: Response,
    pub error: Option<AppError>,
}

impl Outcome {
    pub(crate) const fn delivered(response: Response) -> Self {
        Self {
            response,
            error: None,
        }
    }

    pub(crate) fn failed(response: Response, error: impl Into<AppError>) -> Self {
        Self {
            response,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub fn into_parts(self) -> (Response, Option<AppError>) {
        (self.response, self.error)
    }

    /// # Errors
    ///
    /// Returns the transport or auth error, dropping the response.
    pub fn into_result(self) -> AppResult<Response> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.response),
        }
    }
}
