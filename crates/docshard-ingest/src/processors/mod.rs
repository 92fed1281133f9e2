//! Format processors.
//!
//! Each processor covers one family of formats and follows the same
//! shape: validate the input file, resolve chunk geometry, extract raw
//! content, sanitize extractor metadata, split, and stamp the uniform
//! metadata envelope. Extraction that yields no usable text is a
//! success-empty outcome, not an error; a zero-byte input file is a hard
//! error before extraction is attempted.

mod mht;
mod office;
mod pdf;
mod rtf;
mod text;
mod word;

pub use mht::MhtProcessor;
pub use office::OfficeProcessor;
pub use pdf::PdfProcessor;
pub use rtf::RtfProcessor;
pub use text::TextProcessor;
pub use word::WordProcessor;

use crate::error::{IngestError, IngestResult};
use docshard_core::{ChunkGeometry, ContentHint, DocumentFormat, Fragment};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Per-call options threaded through dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Explicit chunk size; overrides the per-format table.
    pub chunk_size: Option<usize>,
    /// Explicit chunk overlap; overrides the per-format table.
    pub chunk_overlap: Option<usize>,
    /// What content sniffing concluded, for processors that handle
    /// ambiguous extensions.
    pub content_hint: ContentHint,
}

impl ProcessOptions {
    pub fn with_hint(mut self, hint: ContentHint) -> Self {
        self.content_hint = hint;
        self
    }

    pub(crate) fn resolve_geometry(&self, format: DocumentFormat) -> ChunkGeometry {
        ChunkGeometry::resolve(format, self.chunk_size, self.chunk_overlap)
    }
}

/// A processor for one family of document formats.
pub trait FormatProcessor: Send + Sync {
    /// Short identifier recorded in fragment metadata.
    fn name(&self) -> &'static str;

    /// Human-readable description of the formats covered.
    fn file_type_description(&self) -> &'static str;

    /// Extensions this processor claims, lowercase without dots.
    fn supported_extensions(&self) -> &[&'static str];

    /// Whether this processor claims the file's extension.
    fn is_supported_file(&self, path: &Path) -> bool {
        let ext = crate::detect::extension(path);
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&ext))
    }

    /// Extract, chunk, and envelope one file.
    fn process(&self, path: &Path, options: &ProcessOptions) -> IngestResult<Vec<Fragment>>;
}

/// Shared input validation: the file must exist, carry a supported
/// extension, and be non-empty. Returns the file size in bytes.
pub(crate) fn validate_input(
    path: &Path,
    processor: &dyn FormatProcessor,
) -> IngestResult<u64> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }
    if !processor.is_supported_file(path) {
        return Err(IngestError::UnsupportedFileType(crate::detect::extension(
            path,
        )));
    }
    let size = std::fs::metadata(path)?.len();
    if size == 0 {
        return Err(IngestError::EmptyFile(path.to_path_buf()));
    }
    Ok(size)
}

/// Log the outcome of one processing call. An empty result is recorded
/// as a distinct success-empty outcome.
pub(crate) fn log_outcome(
    path: &Path,
    processor: &'static str,
    size: u64,
    started: Instant,
    fragments: &[Fragment],
) {
    let elapsed_ms = started.elapsed().as_millis();
    if fragments.is_empty() {
        info!(
            path = %path.display(),
            processor,
            size_bytes = size,
            elapsed_ms,
            "Processed file: success-empty (no usable text)"
        );
    } else {
        info!(
            path = %path.display(),
            processor,
            size_bytes = size,
            elapsed_ms,
            fragments = fragments.len(),
            "Processed file"
        );
    }
}

/// Log and wrap an extraction failure with a remediation hint.
pub(crate) fn extraction_failure(
    path: &Path,
    processor: &'static str,
    size: u64,
    started: Instant,
    message: String,
    hint: String,
) -> IngestError {
    warn!(
        path = %path.display(),
        processor,
        size_bytes = size,
        elapsed_ms = started.elapsed().as_millis(),
        error = %message,
        "Extraction failed"
    );
    IngestError::extraction(path, processor, message, hint)
}

/// Pick a remediation hint from an extractor error message.
pub(crate) fn hint_for(message: &str, format_hint: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("permission denied") {
        "Check file permissions for the ingest user".to_string()
    } else if lower.contains("password") || lower.contains("encrypt") {
        "The document appears to be encrypted; remove protection before ingesting".to_string()
    } else {
        format_hint.to_string()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use docshard_core::{Fragment, MetaValue};

    /// Assert the invariants every emitted fragment list must satisfy.
    pub fn assert_envelope(fragments: &[Fragment], processor: &str, format: &str) {
        let total = fragments.len() as i64;
        for (i, f) in fragments.iter().enumerate() {
            assert_eq!(f.meta("chunk_id"), Some(&MetaValue::Int(i as i64)));
            assert_eq!(f.meta("total_chunks"), Some(&MetaValue::Int(total)));
            assert_eq!(
                f.meta("processor"),
                Some(&MetaValue::Str(processor.to_string()))
            );
            assert_eq!(
                f.meta("document_format"),
                Some(&MetaValue::Str(format.to_string()))
            );
            assert!(!f.page_content.trim().is_empty());
        }
    }
}
