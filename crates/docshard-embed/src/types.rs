//! Types for embedding API requests and responses.

use serde::{Deserialize, Serialize};

// --- OpenAI /v1/embeddings ---

/// Request body for OpenAI's embeddings endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiEmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
}

/// Response from OpenAI's embeddings endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiEmbeddingResponse {
    pub data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiEmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

// --- Google batchEmbedContents ---

/// Request body for Google's batch embedding endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleBatchEmbedRequest {
    pub requests: Vec<GoogleEmbedRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleEmbedRequest {
    pub model: String,
    pub content: GoogleContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleContent {
    pub parts: Vec<GooglePart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GooglePart {
    pub text: String,
}

/// Response from Google's batch embedding endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleBatchEmbedResponse {
    pub embeddings: Vec<GoogleEmbedding>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEmbedding {
    pub values: Vec<f32>,
}
