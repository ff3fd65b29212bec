use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::AuthError;
use crate::http::{PreAuthRequest, Response};

/// Converts an auth pre-request's response into credentials for the main
/// request.
///
/// The room only calls [`AuthStrategy::authenticate`] for 2xx auth responses.
pub trait AuthStrategy: Send + Sync + fmt::Debug {
    fn pre_request(&self) -> &PreAuthRequest;

    /// Writes credentials into the per-call header snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the auth response carries no usable credential.
    fn authenticate(
        &self,
        auth_response: &Response,
        credentials: &mut HeaderMap,
    ) -> Result<(), AuthError>;
}

/// `Authorization: Bearer <token>` with the token looked up by field name
/// anywhere in the decoded auth response.
#[derive(Debug, Clone)]
pub struct BearerTokenAuth {
    pre_request: PreAuthRequest,
    token_key: String,
}

impl BearerTokenAuth {
    pub fn new(pre_request: impl Into<PreAuthRequest>, token_key: impl Into<String>) -> Self {
        Self {
            pre_request: pre_request.into(),
            token_key: token_key.into(),
        }
    }

    #[must_use]
    pub fn token_key(&self) -> &str {
        &self.token_key
    }
}

impl AuthStrategy for BearerTokenAuth {
    fn pre_request(&self) -> &PreAuthRequest {
        &self.pre_request
    }

    fn authenticate(
        &self,
        auth_response: &Response,
        credentials: &mut HeaderMap,
    ) -> Result<(), AuthError> {
        let token = auth_response
            .value()
            .and_then(|value| find_token(value, &self.token_key))
            .ok_or_else(|| AuthError::TokenNotFound {
                key: self.token_key.clone(),
            })?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_err| {
            AuthError::InvalidToken {
                key: self.token_key.clone(),
            }
        })?;
        credentials.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Depth-first search for `key` through nested objects.
///
/// Only a string value counts as a token; the first key match decides, so a
/// non-string match yields `None` rather than searching further.
#[must_use]
pub fn find_token(value: &Value, key: &str) -> Option<String> {
    let Value::Object(map) = value else {
        return None;
    };
    if let Some(found) = map.get(key) {
        return found.as_str().map(str::to_owned);
    }
    map.values()
        .filter(|child| child.is_object())
        .find_map(|child| find_token(child, key))
}
