//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to open config `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file not found under `{0}` (expected config.json, config.yaml or config.yml)")]
    NotFound(PathBuf),

    #[error("cannot parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
