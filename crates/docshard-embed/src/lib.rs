//! docshard-embed - Embedding vendor clients.
//!
//! Converts fragment text into vectors via a vendor API (Google or
//! OpenAI). Clients are constructed once and shared; construction fails
//! with [`EmbedError::MissingApiKey`] before any network call when no
//! credential is available.

mod error;
mod google;
mod openai;
mod types;
mod vendor;

pub use error::{EmbedError, EmbedResult};
pub use google::GoogleEmbedder;
pub use openai::OpenAiEmbedder;
pub use vendor::{Embedder, EmbeddingVendor};

use docshard_config::EmbeddingConfig;
use std::sync::Arc;

/// Build the embedder selected by the configuration.
pub fn embedder_from_config(config: &EmbeddingConfig) -> EmbedResult<Arc<dyn Embedder>> {
    let vendor = EmbeddingVendor::from_str(&config.vendor)?;
    match vendor {
        EmbeddingVendor::Google => Ok(Arc::new(GoogleEmbedder::new(config.api_key.clone())?)),
        EmbeddingVendor::OpenAi => Ok(Arc::new(OpenAiEmbedder::new(config.api_key.clone())?)),
    }
}
