//! Rooms: one backend connection, its optional auth strategy and its named
//! requests.
mod auth;


use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::http::{Connector, Outcome, Request};

pub use auth::{AuthStrategy, BearerTokenAuth, find_token};

/// Progress of one send through the auth-then-main protocol.
#[derive(Debug)]
pub enum AuthState {
    NoAuth,
    AwaitingAuthResponse(Outcome),
    Authenticated(HeaderMap),
    AuthFailed(Outcome),
}

impl AuthState {
    const fn label(&self) -> &'static str {
        match self {
            AuthState::NoAuth => "no-auth",
            AuthState::AwaitingAuthResponse(_) => "awaiting-auth-response",
            AuthState::Authenticated(_) => "authenticated",
            AuthState::AuthFailed(_) => "auth-failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    connector: Connector,
    auth: Option<Arc<dyn AuthStrategy>>,
    requests: BTreeMap<String, Request>,
}

impl Room {
    #[must_use]
    pub const fn new(connector: Connector) -> Self {
        Self {
            connector,
            auth: None,
            requests: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_auth<S>(mut self, strategy: S) -> Self
    where
        S: AuthStrategy + 'static,
    {
        self.auth = Some(Arc::new(strategy));
        self
    }

    #[must_use]
    pub fn with_request(mut self, key: impl Into<String>, request: Request) -> Self {
        self.requests.insert(key.into(), request);
        self
    }

    pub fn set_auth(&mut self, strategy: Arc<dyn AuthStrategy>) {
        self.auth = Some(strategy);
    }

    pub fn insert_request(&mut self, key: impl Into<String>, request: Request) {
        self.requests.insert(key.into(), request);
    }

    #[must_use]
    pub const fn connector(&self) -> &Connector {
        &self.connector
    }

    #[must_use]
    pub fn auth(&self) -> Option<&dyn AuthStrategy> {
        self.auth.as_deref()
    }

    #[must_use]
    pub fn request(&self, key: &str) -> Option<&Request> {
        self.requests.get(key)
    }

    pub fn request_mut(&mut self, key: &str) -> Option<&mut Request> {
        self.requests.get_mut(key)
    }

    pub fn requests(&self) -> impl Iterator<Item = (&str, &Request)> {
        self.requests
            .iter()
            .map(|(key, request)| (key.as_str(), request))
    }

    /// Sends `request`, authenticating first when the room has a strategy.
    ///
    /// Auth runs on every call; nothing is cached between sends. When auth
    /// fails the main request is never dispatched and the auth response is
    /// returned with the error.
    pub async fn send(&self, request: &Request) -> Outcome {
        let mut state = AuthState::NoAuth;
        loop {
            debug!("Room send state: {}", state.label());
            state = match state {
                AuthState::NoAuth => match self.auth.as_deref() {
                    None => AuthState::Authenticated(HeaderMap::new()),
                    Some(strategy) => AuthState::AwaitingAuthResponse(
                        self.connector
                            .dispatch(strategy.pre_request().request(), &HeaderMap::new())
                            .await,
                    ),
                },
                AuthState::AwaitingAuthResponse(outcome) => self.resolve_credentials(outcome),
                AuthState::Authenticated(credentials) => {
                    return self.connector.dispatch(request, &credentials).await;
                }
                AuthState::AuthFailed(outcome) => return outcome,
            };
        }
    }

    fn resolve_credentials(&self, outcome: Outcome) -> AuthState {
        let Some(strategy) = self.auth.as_deref() else {
            return AuthState::Authenticated(HeaderMap::new());
        };
        if outcome.error.is_some() {
            return AuthState::AuthFailed(outcome);
        }
        if !outcome.response.ok() {
            let status = outcome.response.status();
            warn!("Auth request rejected with status {}", status);
            return AuthState::AuthFailed(Outcome::failed(
                outcome.response,
                AuthError::Rejected { status },
            ));
        }
        let mut credentials = HeaderMap::new();
        match strategy.authenticate(&outcome.response, &mut credentials) {
            Ok(()) => AuthState::Authenticated(credentials),
            Err(err) => {
                warn!("Auth failed: {}", err);
                AuthState::AuthFailed(Outcome::failed(outcome.response, err))
            }
        }
    }
}
