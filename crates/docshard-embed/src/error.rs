//! Error types for embedding operations.

use thiserror::Error;

/// Errors that can occur when generating embeddings.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// No API key in config or environment. Fatal configuration error,
    /// raised at construction before any network call.
    #[error("Missing API key for {vendor}: set {env_var} or provide it in the config")]
    MissingApiKey {
        vendor: &'static str,
        env_var: &'static str,
    },

    /// Unknown vendor name.
    #[error("Invalid embedding vendor: {0} (expected 'google' or 'openai')")]
    InvalidVendor(String),

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response did not contain the expected embedding shape.
    #[error("Failed to parse embedding response: {0}")]
    ParseError(String),

    /// HTTP request error. Propagates uncaught; retry policy belongs to
    /// the orchestrator.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for embedding operations.
pub type EmbedResult<T> = Result<T, EmbedError>;
