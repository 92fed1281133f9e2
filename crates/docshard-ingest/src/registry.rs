//! Processor registry and dispatch.
//!
//! Dispatch is by file extension, except for `.doc` where content
//! sniffing decides between the RTF and Word processors before any
//! extension match runs.

use crate::detect;
use crate::error::{IngestError, IngestResult};
use crate::processors::{
    FormatProcessor, MhtProcessor, OfficeProcessor, PdfProcessor, ProcessOptions, RtfProcessor,
    TextProcessor, WordProcessor,
};
use docshard_core::{ContentHint, Fragment};
use docshard_ocr::OcrEngine;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Registry of format processors.
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn FormatProcessor>>,
}

impl ProcessorRegistry {
    /// Empty registry; callers register processors themselves.
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Registry with the full default processor set. The OCR engine, if
    /// given, backs the PDF processor's last extraction tier.
    pub fn with_defaults(ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        let pdf = match ocr {
            Some(engine) => PdfProcessor::with_ocr(engine),
            None => PdfProcessor::new(),
        };
        let mut registry = Self::new();
        registry.register(Arc::new(pdf));
        registry.register(Arc::new(WordProcessor::new()));
        registry.register(Arc::new(RtfProcessor::new()));
        registry.register(Arc::new(OfficeProcessor::new()));
        registry.register(Arc::new(MhtProcessor::new()));
        registry.register(Arc::new(TextProcessor::new()));
        registry
    }

    pub fn register(&mut self, processor: Arc<dyn FormatProcessor>) {
        self.processors.push(processor);
    }

    /// Resolve the processor for a path, plus the content hint dispatch
    /// derived along the way.
    ///
    /// `.doc` is special-cased: content sniffing overrides the extension,
    /// so an RTF body behind a `.doc` name reaches the RTF processor. All
    /// other extensions match case-insensitively; when several processors
    /// claim one, the Word and Office processors win the tie.
    pub fn get_processor_for(
        &self,
        path: &Path,
    ) -> IngestResult<(Arc<dyn FormatProcessor>, ContentHint)> {
        let ext = detect::extension(path);

        if ext == "doc" {
            let hint = detect::detect_content(path);
            let name = if hint == ContentHint::Rtf { "rtf" } else { "word" };
            debug!(
                path = %path.display(),
                hint = hint.as_str(),
                processor = name,
                "Resolved .doc dispatch from content"
            );
            return self
                .by_name(name)
                .map(|p| (p, hint))
                .ok_or_else(|| IngestError::UnsupportedFileType(ext));
        }

        let claimants: Vec<&Arc<dyn FormatProcessor>> = self
            .processors
            .iter()
            .filter(|p| {
                p.supported_extensions()
                    .iter()
                    .any(|e| e.eq_ignore_ascii_case(&ext))
            })
            .collect();

        let chosen = claimants
            .iter()
            .find(|p| matches!(p.name(), "word" | "office"))
            .or_else(|| claimants.first());

        match chosen {
            Some(p) => Ok((Arc::clone(p), ContentHint::Unknown)),
            None => Err(IngestError::UnsupportedFileType(ext)),
        }
    }

    /// Dispatch one file through its processor.
    pub fn process_document(
        &self,
        path: &Path,
        options: &ProcessOptions,
    ) -> IngestResult<Vec<Fragment>> {
        let (processor, hint) = self.get_processor_for(path)?;
        let options = options.with_hint(hint);
        processor.process(path, &options)
    }

    /// Union of every registered processor's extensions.
    pub fn supported_extensions(&self) -> BTreeSet<String> {
        self.processors
            .iter()
            .flat_map(|p| p.supported_extensions().iter().map(|e| e.to_string()))
            .collect()
    }

    fn by_name(&self, name: &str) -> Option<Arc<dyn FormatProcessor>> {
        self.processors
            .iter()
            .find(|p| p.name() == name)
            .map(Arc::clone)
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_defaults(None)
    }
}
