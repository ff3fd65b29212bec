//! Integration file loading: environment interpolation, then YAML, JSON or
//! TOML parsing.
mod interpolate;
mod loader;
pub mod types;

#[cfg(test)]
mod tests;

pub use interpolate::{expand_env, expand_with};
pub use loader::{DEFAULT_CONFIG_FILES, load_config, load_config_file, parse_yaml};
pub use types::{
    AuthConfig, BodyConfig, ConnectionConfig, DynamicContent, ElevatorConfig, RequestConfig,
    RoomConfig,
};
