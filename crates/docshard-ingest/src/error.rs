//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
///
/// Input errors (missing file, unsupported extension, zero-byte file)
/// surface immediately and are never retried here. Extraction errors are
/// wrapped with a remediation hint and propagate as fatal for the file.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Extraction failed for {path} ({processor}): {message}. {hint}")]
    Extraction {
        path: PathBuf,
        processor: &'static str,
        message: String,
        hint: String,
    },
}

impl IngestError {
    /// Wrap an extractor failure with an actionable hint, picking the
    /// remediation from the error text where identifiable.
    pub fn extraction(
        path: &std::path::Path,
        processor: &'static str,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        IngestError::Extraction {
            path: path.to_path_buf(),
            processor,
            message: message.into(),
            hint: hint.into(),
        }
    }
}
