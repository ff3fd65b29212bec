use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to '{url}' timed out: {source}")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to connect to '{url}': {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body from '{url}': {source}")]
    ReadBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build request for '{url}': {source}")]
    BuildRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to join path '{path}' onto base URL: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to read form file '{path}': {source}")]
    ReadFormFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode request body: {source}")]
    EncodeBody {
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid mime type for form part '{name}': {source}")]
    InvalidPartMime {
        name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request was cancelled before it completed.")]
    Cancelled,
}

impl TransportError {
    /// Classifies a reqwest send failure.
    pub(crate) fn from_send(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_owned();
        if source.is_timeout() {
            Self::Timeout { url, source }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else {
            Self::Request { url, source }
        }
    }
}
