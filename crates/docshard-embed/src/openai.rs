//! OpenAI embedding client.

use crate::error::{EmbedError, EmbedResult};
use crate::types::{OpenAiEmbeddingRequest, OpenAiEmbeddingResponse};
use crate::vendor::{resolve_api_key, Embedder, EmbeddingVendor};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const DEFAULT_MODEL: &str = "text-embedding-3-small";
const API_URL: &str = "https://api.openai.com/v1/embeddings";

/// Client for OpenAI's embeddings API.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    /// Create a client, resolving the API key from the explicit value or
    /// `OPENAI_API_KEY`. Fails before any network call if neither is set.
    pub fn new(api_key: Option<String>) -> EmbedResult<Self> {
        let api_key = resolve_api_key(EmbeddingVendor::OpenAi, api_key)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(EmbedError::Http)?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            "Embedding {} texts with OpenAI model {}",
            texts.len(),
            self.model
        );

        let request = OpenAiEmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError { status, message });
        }

        let body: OpenAiEmbeddingResponse = response.json().await?;
        if body.data.len() != texts.len() {
            return Err(EmbedError::ParseError(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        // Order by the index field, not response position.
        let mut vectors = vec![Vec::new(); texts.len()];
        for item in body.data {
            if item.index >= vectors.len() {
                return Err(EmbedError::ParseError(format!(
                    "embedding index {} out of range",
                    item.index
                )));
            }
            vectors[item.index] = item.embedding;
        }
        Ok(vectors)
    }

    fn vendor(&self) -> EmbeddingVendor {
        EmbeddingVendor::OpenAi
    }
}
