//! Error types for OCR processing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for OCR operations.
pub type OcrResult<T> = Result<T, OcrError>;

/// Errors that can occur during OCR.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Tool not found: {tool}. Please install it.")]
    ToolNotFound { tool: String },

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Rasterization error: {0}")]
    Rasterization(String),

    #[error("Process failed with exit code {code}: {stderr}")]
    ProcessFailed { code: i32, stderr: String },
}
