//! Embedding vendor selection.

use crate::error::{EmbedError, EmbedResult};
use async_trait::async_trait;

/// The provider whose API converts fragment text into vectors.
///
/// Each vendor carries its own default collection name and embedded-store
/// directory so vectors of different dimensionality never end up in the
/// same collection by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingVendor {
    Google,
    OpenAi,
}

impl EmbeddingVendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingVendor::Google => "google",
            EmbeddingVendor::OpenAi => "openai",
        }
    }

    pub fn from_str(s: &str) -> EmbedResult<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(EmbeddingVendor::Google),
            "openai" => Ok(EmbeddingVendor::OpenAi),
            other => Err(EmbedError::InvalidVendor(other.to_string())),
        }
    }

    /// Environment variable consulted when no explicit API key is given.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            EmbeddingVendor::Google => "GOOGLE_API_KEY",
            EmbeddingVendor::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Default collection name for this vendor.
    pub fn default_collection(&self) -> &'static str {
        match self {
            EmbeddingVendor::Google => "docshard_google",
            EmbeddingVendor::OpenAi => "docshard_openai",
        }
    }

    /// Default embedded-store directory for this vendor.
    pub fn default_persist_dir(&self) -> &'static str {
        match self {
            EmbeddingVendor::Google => "vector_store_google",
            EmbeddingVendor::OpenAi => "vector_store_openai",
        }
    }
}

impl std::fmt::Display for EmbeddingVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A client that turns batches of text into embedding vectors.
///
/// Constructed once and shared across in-flight processing calls.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>>;

    /// The vendor backing this client.
    fn vendor(&self) -> EmbeddingVendor;
}

/// Resolve an API key: explicit config value first, then the vendor's
/// environment variable. Absence is fatal.
pub(crate) fn resolve_api_key(
    vendor: EmbeddingVendor,
    explicit: Option<String>,
) -> EmbedResult<String> {
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Ok(key);
    }
    match std::env::var(vendor.api_key_var()) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(EmbedError::MissingApiKey {
            vendor: vendor.as_str(),
            env_var: vendor.api_key_var(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_parsing() {
        assert_eq!(
            EmbeddingVendor::from_str("Google").unwrap(),
            EmbeddingVendor::Google
        );
        assert_eq!(
            EmbeddingVendor::from_str("OPENAI").unwrap(),
            EmbeddingVendor::OpenAi
        );
        assert!(matches!(
            EmbeddingVendor::from_str("cohere"),
            Err(EmbedError::InvalidVendor(_))
        ));
    }

    #[test]
    fn vendor_defaults_never_collide() {
        assert_ne!(
            EmbeddingVendor::Google.default_collection(),
            EmbeddingVendor::OpenAi.default_collection()
        );
        assert_ne!(
            EmbeddingVendor::Google.default_persist_dir(),
            EmbeddingVendor::OpenAi.default_persist_dir()
        );
    }

    #[test]
    fn explicit_key_wins() {
        let key = resolve_api_key(EmbeddingVendor::Google, Some("abc".into())).unwrap();
        assert_eq!(key, "abc");
    }

    #[test]
    fn blank_explicit_key_is_absent() {
        // Falls back to the environment, which may or may not hold a key;
        // either way a blank explicit key must not be accepted.
        match resolve_api_key(EmbeddingVendor::OpenAi, Some("  ".into())) {
            Ok(key) => assert!(!key.trim().is_empty()),
            Err(EmbedError::MissingApiKey { vendor, .. }) => assert_eq!(vendor, "openai"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
