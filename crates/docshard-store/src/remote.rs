//! Remote vector store client (Chroma-compatible REST API).

use crate::error::{StoreError, StoreResult};
use docshard_core::Fragment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct AddRequest {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    metadatas: Vec<BTreeMap<String, docshard_core::MetaValue>>,
    documents: Vec<String>,
}

/// Client for a vector store server reachable over HTTP.
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{host}:{port}"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Find or create a collection on the server. Returns its id.
    pub async fn get_or_create_collection(&self, name: &str) -> StoreResult<String> {
        let url = format!("{}/api/v1/collections", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateCollectionRequest {
                name,
                get_or_create: true,
            })
            .send()
            .await?;

        let response = check_status(response).await?;
        let collection: CollectionResponse = response.json().await?;
        debug!("Resolved remote collection {} ({})", name, collection.id);
        Ok(collection.id)
    }

    /// Upload fragments with their vectors. The two slices must be the
    /// same length. Returns the number uploaded.
    pub async fn add_fragments(
        &self,
        collection_id: &str,
        fragments: &[Fragment],
        vectors: &[Vec<f32>],
        ids: Vec<String>,
    ) -> StoreResult<usize> {
        debug_assert_eq!(fragments.len(), vectors.len());

        let url = format!("{}/api/v1/collections/{}/add", self.base_url, collection_id);
        let request = AddRequest {
            ids,
            embeddings: vectors.to_vec(),
            metadatas: fragments.iter().map(|f| f.metadata.clone()).collect(),
            documents: fragments.iter().map(|f| f.page_content.clone()).collect(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        check_status(response).await?;
        Ok(fragments.len())
    }
}

async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_assembled_from_host_and_port() {
        let store = RemoteStore::new("vectors.internal", 8000);
        assert_eq!(store.base_url(), "http://vectors.internal:8000");
    }
}
