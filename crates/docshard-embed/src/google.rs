//! Google Generative Language embedding client.

use crate::error::{EmbedError, EmbedResult};
use crate::types::{
    GoogleBatchEmbedRequest, GoogleBatchEmbedResponse, GoogleContent, GoogleEmbedRequest,
    GooglePart,
};
use crate::vendor::{resolve_api_key, Embedder, EmbeddingVendor};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const DEFAULT_MODEL: &str = "text-embedding-004";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for Google's batch embedding API.
#[derive(Clone)]
pub struct GoogleEmbedder {
    client: Client,
    api_key: String,
    model: String,
}

impl GoogleEmbedder {
    /// Create a client, resolving the API key from the explicit value or
    /// `GOOGLE_API_KEY`. Fails before any network call if neither is set.
    pub fn new(api_key: Option<String>) -> EmbedResult<Self> {
        let api_key = resolve_api_key(EmbeddingVendor::Google, api_key)?;
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
impl Embedder for GoogleEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            "Embedding {} texts with Google model {}",
            texts.len(),
            self.model
        );

        let model_path = format!("models/{}", self.model);
        let url = format!(
            "{API_BASE}/{model_path}:batchEmbedContents?key={}",
            self.api_key
        );

        let request = GoogleBatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| GoogleEmbedRequest {
                    model: model_path.clone(),
                    content: GoogleContent {
                        parts: vec![GooglePart { text: text.clone() }],
                    },
                })
                .collect(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError { status, message });
        }

        let body: GoogleBatchEmbedResponse = response.json().await?;
        if body.embeddings.len() != texts.len() {
            return Err(EmbedError::ParseError(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn vendor(&self) -> EmbeddingVendor {
        EmbeddingVendor::Google
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_fatal_before_any_request() {
        if std::env::var("GOOGLE_API_KEY").is_err() {
            let result = GoogleEmbedder::new(None);
            assert!(matches!(
                result,
                Err(EmbedError::MissingApiKey { vendor: "google", .. })
            ));
        }
    }

    #[test]
    fn explicit_key_constructs() {
        let embedder = GoogleEmbedder::new(Some("test-key".into())).unwrap();
        assert_eq!(embedder.vendor(), EmbeddingVendor::Google);
    }
}
