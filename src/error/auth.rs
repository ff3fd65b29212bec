use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth request was rejected with status {status}.")]
    Rejected { status: u16 },
    #[error("authToken '{key}' can not be found in the auth response.")]
    TokenNotFound { key: String },
    #[error("Token found under '{key}' is not a valid header value.")]
    InvalidToken { key: String },
}
