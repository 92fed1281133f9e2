//! Vector store gateway: embed fragments and persist them.

use crate::embedded::{fragment_id, EmbeddedStore};
use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteStore;
use docshard_config::StoreConfig;
use docshard_core::Fragment;
use docshard_embed::Embedder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Default port for a remote vector store server.
pub const DEFAULT_REMOTE_PORT: u16 = 8000;

/// Database file name used inside an embedded persistence directory.
const EMBEDDED_DB_FILE: &str = "docshard.sqlite3";

/// Where vectors go.
#[derive(Debug, Clone)]
pub enum StoreMode {
    /// Local SQLite persistence. A missing directory falls back to the
    /// embedding vendor's default so vectors of different dimensionality
    /// never share a database by accident.
    Embedded { persist_dir: Option<PathBuf> },
    /// A vector store server reachable over HTTP.
    Remote { host: String, port: u16 },
}

/// Per-call storage options.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub mode: StoreMode,
    /// Collection name; the vendor's default when absent.
    pub collection: Option<String>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            mode: StoreMode::Embedded { persist_dir: None },
            collection: None,
        }
    }
}

impl StoreOptions {
    /// Build options from the configuration file's store section.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let mode = match config.mode.to_lowercase().as_str() {
            "embedded" => StoreMode::Embedded {
                persist_dir: config.persist_dir.clone(),
            },
            "remote" => {
                let host = config
                    .host
                    .as_deref()
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .ok_or(StoreError::MissingHost)?
                    .to_string();
                StoreMode::Remote {
                    host,
                    port: config.port.unwrap_or(DEFAULT_REMOTE_PORT),
                }
            }
            other => return Err(StoreError::InvalidMode(other.to_string())),
        };
        Ok(Self {
            mode,
            collection: config.collection.clone(),
        })
    }
}

/// Summary of one storage call.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    pub collection: String,
    pub mode: &'static str,
    /// Persistence directory (embedded) or server URL (remote).
    pub location: String,
    pub fragments_stored: usize,
}

/// Persists fragments through an embedding client.
///
/// The embedder is constructed before the gateway, so a missing API key
/// fails at setup time rather than mid-batch.
pub struct VectorStoreGateway {
    embedder: Arc<dyn Embedder>,
}

impl VectorStoreGateway {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embed and persist a batch of fragments.
    ///
    /// The target collection is ensured even for an empty batch, so a
    /// caller that processed a document to no usable text still ends up
    /// with a queryable (empty) collection.
    pub async fn store_fragments(
        &self,
        fragments: &[Fragment],
        options: &StoreOptions,
    ) -> StoreResult<StoreHandle> {
        let vendor = self.embedder.vendor();
        let collection = options
            .collection
            .clone()
            .unwrap_or_else(|| vendor.default_collection().to_string());

        let handle = match &options.mode {
            StoreMode::Embedded { persist_dir } => {
                let dir = persist_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(vendor.default_persist_dir()));
                let store = EmbeddedStore::open(dir.join(EMBEDDED_DB_FILE))?;
                let collection_id = store.get_or_create_collection(&collection)?;

                let stored = if fragments.is_empty() {
                    0
                } else {
                    let vectors = self.embed(fragments).await?;
                    store.add_fragments(&collection_id, fragments, &vectors, vendor.as_str())?
                };

                StoreHandle {
                    collection,
                    mode: "embedded",
                    location: dir.display().to_string(),
                    fragments_stored: stored,
                }
            }
            StoreMode::Remote { host, port } => {
                let store = RemoteStore::new(host, *port);
                let collection_id = store.get_or_create_collection(&collection).await?;

                let stored = if fragments.is_empty() {
                    0
                } else {
                    let vectors = self.embed(fragments).await?;
                    let ids = fragments.iter().map(fragment_id).collect();
                    store
                        .add_fragments(&collection_id, fragments, &vectors, ids)
                        .await?
                };

                StoreHandle {
                    collection,
                    mode: "remote",
                    location: store.base_url().to_string(),
                    fragments_stored: stored,
                }
            }
        };

        info!(
            collection = %handle.collection,
            mode = handle.mode,
            location = %handle.location,
            fragments = handle.fragments_stored,
            vendor = vendor.as_str(),
            "Stored fragments"
        );
        Ok(handle)
    }

    async fn embed(&self, fragments: &[Fragment]) -> StoreResult<Vec<Vec<f32>>> {
        let texts: Vec<String> = fragments.iter().map(|f| f.page_content.clone()).collect();
        Ok(self.embedder.embed_batch(&texts).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshard_core::MetaValue;
    use docshard_embed::{EmbedResult, EmbeddingVendor};

    struct FakeEmbedder {
        vendor: EmbeddingVendor,
    }

    #[async_trait::async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn vendor(&self) -> EmbeddingVendor {
            self.vendor
        }
    }

    fn gateway(vendor: EmbeddingVendor) -> VectorStoreGateway {
        VectorStoreGateway::new(Arc::new(FakeEmbedder { vendor }))
    }

    fn fragment(doc: &str, chunk: i64, content: &str) -> Fragment {
        let mut f = Fragment::new(content);
        f.metadata
            .insert("document_id".into(), MetaValue::Str(doc.into()));
        f.metadata.insert("chunk_id".into(), MetaValue::Int(chunk));
        f
    }

    fn embedded_options(dir: &std::path::Path) -> StoreOptions {
        StoreOptions {
            mode: StoreMode::Embedded {
                persist_dir: Some(dir.to_path_buf()),
            },
            collection: None,
        }
    }

    #[tokio::test]
    async fn stores_fragments_in_embedded_mode() {
        let dir = tempfile::tempdir().unwrap();
        let fragments = vec![
            fragment("report_pdf", 0, "first chunk"),
            fragment("report_pdf", 1, "second chunk"),
        ];

        let handle = gateway(EmbeddingVendor::Google)
            .store_fragments(&fragments, &embedded_options(dir.path()))
            .await
            .unwrap();

        assert_eq!(handle.fragments_stored, 2);
        assert_eq!(handle.mode, "embedded");
        assert_eq!(handle.collection, "docshard_google");

        let store = EmbeddedStore::open(dir.path().join(EMBEDDED_DB_FILE)).unwrap();
        let id = store.get_or_create_collection("docshard_google").unwrap();
        assert_eq!(store.count_fragments(&id).unwrap(), 2);
    }

    #[tokio::test]
    async fn vendors_get_distinct_default_collections() {
        let dir = tempfile::tempdir().unwrap();
        let fragments = vec![fragment("a_pdf", 0, "text")];

        let google = gateway(EmbeddingVendor::Google)
            .store_fragments(&fragments, &embedded_options(dir.path()))
            .await
            .unwrap();
        let openai = gateway(EmbeddingVendor::OpenAi)
            .store_fragments(&fragments, &embedded_options(dir.path()))
            .await
            .unwrap();

        assert_eq!(google.collection, "docshard_google");
        assert_eq!(openai.collection, "docshard_openai");
        assert_ne!(google.collection, openai.collection);
    }

    #[tokio::test]
    async fn empty_batch_still_ensures_the_collection() {
        let dir = tempfile::tempdir().unwrap();

        let handle = gateway(EmbeddingVendor::OpenAi)
            .store_fragments(&[], &embedded_options(dir.path()))
            .await
            .unwrap();

        assert_eq!(handle.fragments_stored, 0);
        assert_eq!(handle.collection, "docshard_openai");

        let store = EmbeddedStore::open(dir.path().join(EMBEDDED_DB_FILE)).unwrap();
        let id = store.get_or_create_collection("docshard_openai").unwrap();
        assert_eq!(store.count_fragments(&id).unwrap(), 0);
    }

    #[tokio::test]
    async fn explicit_collection_overrides_vendor_default() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            collection: Some("quarterly_reports".to_string()),
            ..embedded_options(dir.path())
        };

        let handle = gateway(EmbeddingVendor::Google)
            .store_fragments(&[fragment("q_pdf", 0, "text")], &options)
            .await
            .unwrap();
        assert_eq!(handle.collection, "quarterly_reports");
    }

    #[test]
    fn remote_options_require_a_host() {
        let config = StoreConfig {
            mode: "remote".to_string(),
            host: None,
            port: None,
            persist_dir: None,
            collection: None,
        };
        assert!(matches!(
            StoreOptions::from_config(&config),
            Err(StoreError::MissingHost)
        ));
    }

    #[test]
    fn remote_options_default_the_port() {
        let config = StoreConfig {
            mode: "remote".to_string(),
            host: Some("localhost".to_string()),
            port: None,
            persist_dir: None,
            collection: None,
        };
        let options = StoreOptions::from_config(&config).unwrap();
        match options.mode {
            StoreMode::Remote { host, port } => {
                assert_eq!(host, "localhost");
                assert_eq!(port, DEFAULT_REMOTE_PORT);
            }
            other => panic!("expected remote mode, got {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let config = StoreConfig {
            mode: "clustered".to_string(),
            host: None,
            port: None,
            persist_dir: None,
            collection: None,
        };
        assert!(matches!(
            StoreOptions::from_config(&config),
            Err(StoreError::InvalidMode(_))
        ));
    }
}
