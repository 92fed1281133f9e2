//! Embedded vector store backed by SQLite.

use crate::error::{StoreError, StoreResult};
use docshard_core::Fragment;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

pub type ConnectionPool = Pool<SqliteConnectionManager>;
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// On-disk vector store. One database file holds any number of named
/// collections; vectors are persisted as little-endian f32 blobs next to
/// their dimension count.
#[derive(Clone)]
pub struct EmbeddedStore {
    pool: ConnectionPool,
}

impl EmbeddedStore {
    /// Open (or create) a store at the given database path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening embedded vector store at: {}", path.display());

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;",
            )?;
            Ok(())
        });

        let pool = Pool::builder().max_size(10).build(manager)?;

        {
            let conn = pool.get()?;
            initialize_schema(&conn)?;
        }

        Ok(Self { pool })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        // Memory DB only supports a single connection
        let pool = Pool::builder().max_size(1).build(manager)?;

        {
            let conn = pool.get()?;
            initialize_schema(&conn)?;
        }

        Ok(Self { pool })
    }

    fn conn(&self) -> StoreResult<PooledConn> {
        self.pool.get().map_err(StoreError::from)
    }

    /// Find a collection by name, creating it if absent. Returns the
    /// collection id.
    pub fn get_or_create_collection(&self, name: &str) -> StoreResult<String> {
        let conn = self.conn()?;

        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let id = uuid::Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO collections (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![id, name, chrono::Utc::now().to_rfc3339()],
        )?;
        debug!("Created collection {} ({})", name, id);
        Ok(id)
    }

    /// Persist fragments and their vectors into a collection. The two
    /// slices must be the same length. Returns the number stored.
    pub fn add_fragments(
        &self,
        collection_id: &str,
        fragments: &[Fragment],
        vectors: &[Vec<f32>],
        vendor: &str,
    ) -> StoreResult<usize> {
        debug_assert_eq!(fragments.len(), vectors.len());

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = chrono::Utc::now().to_rfc3339();

        for (fragment, vector) in fragments.iter().zip(vectors) {
            let id = fragment_id(fragment);
            let metadata = serde_json::to_string(&fragment.metadata)?;
            let hash = content_hash(&fragment.page_content);

            tx.execute(
                "INSERT OR REPLACE INTO fragments
                     (id, collection_id, document_id, content, content_hash, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    collection_id,
                    fragment
                        .meta("document_id")
                        .map(|v| v.to_display_string())
                        .unwrap_or_default(),
                    fragment.page_content,
                    hash,
                    metadata,
                    now,
                ],
            )?;

            tx.execute(
                "INSERT OR REPLACE INTO embeddings (fragment_id, vector, dimensions, vendor)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, encode_vector(vector), vector.len() as i64, vendor],
            )?;
        }

        tx.commit()?;
        Ok(fragments.len())
    }

    /// Number of fragments in a collection.
    pub fn count_fragments(&self, collection_id: &str) -> StoreResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM fragments WHERE collection_id = ?1",
            params![collection_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Fetch a stored vector by fragment id.
    pub fn get_vector(&self, fragment_id: &str) -> StoreResult<Option<Vec<f32>>> {
        let conn = self.conn()?;
        let row: Option<(Vec<u8>, i64)> = conn
            .query_row(
                "SELECT vector, dimensions FROM embeddings WHERE fragment_id = ?1",
                params![fragment_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        Ok(row.map(|(bytes, dims)| decode_vector(&bytes, dims as usize)))
    }
}

fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS fragments (
            id TEXT PRIMARY KEY,
            collection_id TEXT NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
            document_id TEXT NOT NULL,
            content TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            metadata TEXT DEFAULT '{}',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_fragments_collection ON fragments(collection_id);
        CREATE INDEX IF NOT EXISTS idx_fragments_document ON fragments(document_id);
        CREATE INDEX IF NOT EXISTS idx_fragments_hash ON fragments(content_hash);

        -- Vectors stored as little-endian f32 blobs
        CREATE TABLE IF NOT EXISTS embeddings (
            fragment_id TEXT PRIMARY KEY REFERENCES fragments(id) ON DELETE CASCADE,
            vector BLOB NOT NULL,
            dimensions INTEGER NOT NULL,
            vendor TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Stable fragment id: document id plus chunk index when the metadata
/// carries both, otherwise a fresh UUID.
pub(crate) fn fragment_id(fragment: &Fragment) -> String {
    match (fragment.meta("document_id"), fragment.meta("chunk_id")) {
        (Some(doc), Some(chunk)) => {
            format!("{}_{}", doc.to_display_string(), chunk.to_display_string())
        }
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_vector(bytes: &[u8], dimensions: usize) -> Vec<f32> {
    bytes
        .chunks(4)
        .take(dimensions)
        .map(|chunk| {
            if chunk.len() == 4 {
                f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
            } else {
                0.0
            }
        })
        .collect()
}
