//! Error types for config loading.

use thiserror::Error;

/// Errors returned while loading config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(String),
}
