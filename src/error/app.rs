use thiserror::Error;

use super::{AuthError, ConfigError, DecodeError, DynamicFieldError, TransportError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Dynamic field error: {0}")]
    DynamicField(#[from] DynamicFieldError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn transport<E>(error: E) -> Self
    where
        E: Into<TransportError>,
    {
        error.into().into()
    }

    pub fn auth<E>(error: E) -> Self
    where
        E: Into<AuthError>,
    {
        error.into().into()
    }

    pub fn decode<E>(error: E) -> Self
    where
        E: Into<DecodeError>,
    {
        error.into().into()
    }

    pub fn dynamic_field<E>(error: E) -> Self
    where
        E: Into<DynamicFieldError>,
    {
        error.into().into()
    }

    /// Wiring mistakes: unknown keys, malformed config, unresolved templates.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DynamicField(_))
    }

    /// Runtime conditions that arrive paired with a response.
    #[must_use]
    pub const fn is_runtime(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Auth(_))
    }
}
