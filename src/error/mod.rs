mod app;
mod auth;
mod config;
mod decode;
mod dynamic;
mod transport;

pub use app::{AppError, AppResult};
pub use auth::AuthError;
pub use config::ConfigError;
pub use decode::DecodeError;
pub use dynamic::DynamicFieldError;
pub use transport::TransportError;
