//! Configuration error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Invalid embedding vendor: {0} (expected 'google' or 'openai')")]
    InvalidVendor(String),

    #[error("Invalid vector store mode: {0} (expected 'embedded' or 'remote')")]
    InvalidMode(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Remote mode requires a host")]
    MissingHost,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
