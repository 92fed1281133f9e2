//! docshard-config - Configuration types for the ingestion pipeline.
//!
//! The orchestrator loads and validates this before the pipeline runs;
//! the pipeline itself trusts a structurally valid config and fails fast
//! only on missing credentials or invalid enum values.

mod config;
mod error;
mod paths;

pub use config::{ChunkingConfig, Config, EmbeddingConfig, StoreConfig};
pub use error::{ConfigError, ConfigResult};
pub use paths::AppPaths;
