//! Plain text processor.

use super::{log_outcome, validate_input, FormatProcessor, ProcessOptions};
use crate::error::IngestResult;
use crate::splitter::{TextSplitter, SPLITTING_METHOD};
use docshard_core::{DocumentFormat, Fragment, FragmentEnvelope};
use std::path::Path;
use std::time::Instant;

/// Processor for plain text and markdown files.
pub struct TextProcessor;

impl TextProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatProcessor for TextProcessor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn file_type_description(&self) -> &'static str {
        "Plain text and markdown documents"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["txt", "text", "log", "md", "markdown"]
    }

    fn process(&self, path: &Path, options: &ProcessOptions) -> IngestResult<Vec<Fragment>> {
        let started = Instant::now();
        let size = validate_input(path, self)?;

        let ext = crate::detect::extension(path);
        let format = DocumentFormat::from_extension(&ext).unwrap_or(DocumentFormat::Text);

        let bytes = std::fs::read(path)?;
        let content = decode_text(&bytes);

        let geometry = options.resolve_geometry(format);
        let chunks = TextSplitter::new(format, geometry).split(&content);
        let fragments = FragmentEnvelope::new(path, format, self.name(), geometry, SPLITTING_METHOD)
            .wrap(chunks);

        log_outcome(path, self.name(), size, started, &fragments);
        Ok(fragments)
    }
}

/// Lossy decode with BOM stripping.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes
        .strip_prefix(&[0xEF, 0xBB, 0xBF])
        .unwrap_or(bytes);
    String::from_utf8_lossy(bytes).to_string()
}
