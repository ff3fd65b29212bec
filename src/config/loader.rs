use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::interpolate::expand_env;
use super::types::ElevatorConfig;

/// Config filenames tried in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 4] = [
    "elevator.yaml",
    "elevator.yml",
    "elevator.json",
    "elevator.toml",
];

/// Loads an integration file from `path`, or from the first default
/// location that exists.
///
/// # Errors
///
/// Returns an error when no file is found or it cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> AppResult<ElevatorConfig> {
    if let Some(path) = path {
        return load_config_file(path);
    }

    for candidate in DEFAULT_CONFIG_FILES {
        let candidate = PathBuf::from(candidate);
        if candidate.exists() {
            return load_config_file(&candidate);
        }
    }

    Err(AppError::config(ConfigError::ConfigNotFound {
        candidates: DEFAULT_CONFIG_FILES.join(", "),
    }))
}

/// Reads `path`, expands environment variables, then parses by extension.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unknown extension,
/// or does not parse.
pub fn load_config_file(path: &Path) -> AppResult<ElevatorConfig> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let content = expand_env(&raw);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => parse_yaml(&content).map_err(|err| {
            AppError::config(ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}

/// Parses YAML text that has already been interpolated.
///
/// # Errors
///
/// Returns the YAML parse error.
pub fn parse_yaml(content: &str) -> Result<ElevatorConfig, serde_yaml::Error> {
    serde_yaml::from_str(content)
}
