//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Structural validation: enum strings, port range, remote-mode host.
    pub fn validate(&self) -> ConfigResult<()> {
        self.embedding.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

/// Embedding vendor selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Vendor name: "google" or "openai".
    pub vendor: String,
    /// Explicit API key; when absent the vendor's environment variable is
    /// consulted at client construction time.
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            vendor: "google".to_string(),
            api_key: None,
        }
    }
}

impl EmbeddingConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.vendor.to_lowercase().as_str() {
            "google" | "openai" => Ok(()),
            other => Err(ConfigError::InvalidVendor(other.to_string())),
        }
    }
}

/// Vector store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Client mode: "embedded" or "remote".
    pub mode: String,
    /// Remote host (remote mode only).
    pub host: Option<String>,
    /// Remote port (remote mode only).
    pub port: Option<u16>,
    /// Embedded persistence directory override.
    pub persist_dir: Option<PathBuf>,
    /// Collection name override.
    pub collection: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: "embedded".to_string(),
            host: None,
            port: None,
            persist_dir: None,
            collection: None,
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.mode.to_lowercase().as_str() {
            "embedded" => Ok(()),
            "remote" => {
                if self.host.as_deref().map_or(true, |h| h.trim().is_empty()) {
                    return Err(ConfigError::MissingHost);
                }
                match self.port {
                    Some(0) => Err(ConfigError::InvalidPort("0".to_string())),
                    _ => Ok(()),
                }
            }
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Optional chunk-geometry overrides applied to every processing call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
}
