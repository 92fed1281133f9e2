//! Store error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid store mode: {0} (expected \"embedded\" or \"remote\")")]
    InvalidMode(String),

    #[error("remote mode requires a host")]
    MissingHost,

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Embed(#[from] docshard_embed::EmbedError),
}
