use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML config '{path}': {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .yaml, .yml, .json or .toml.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have a .yaml, .yml, .json or .toml extension.")]
    MissingExtension,
    #[error("No config file found (looked for {candidates}).")]
    ConfigNotFound { candidates: String },
    #[error("Room '{room}' is not configured.")]
    UnknownRoom { room: String },
    #[error("Request '{request}' is not configured on room '{room}'.")]
    UnknownRequest { room: String, request: String },
    #[error("Room '{room}' has an invalid baseUrl '{url}': {source}")]
    InvalidBaseUrl {
        room: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Room '{room}' has an invalid header '{name}'.")]
    InvalidHeader { room: String, name: String },
    #[error("Room '{room}' uses unsupported auth type '{kind}'. Use 'bearer' or omit auth.")]
    UnsupportedAuthType { room: String, kind: String },
    #[error("Room '{room}' declares bearer auth without accessTokenKey.")]
    MissingAccessTokenKey { room: String },
    #[error("Room '{room}' declares bearer auth without an auth request path.")]
    MissingAuthRequest { room: String },
    #[error(
        "Unsupported body type '{kind}' for request '{request}' on room '{room}'. Use json, form or multipart-form."
    )]
    UnsupportedBodyType {
        room: String,
        request: String,
        kind: String,
    },
    #[error("Body content for '{kind}' must be a mapping of field names to values.")]
    InvalidBodyContent { kind: String },
    #[error("Invalid HTTP method '{value}'.")]
    InvalidMethod { value: String },
    #[error("Failed to build HTTP client for room '{room}': {source}")]
    BuildClient {
        room: String,
        #[source]
        source: reqwest::Error,
    },
}
