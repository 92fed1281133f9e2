//! PDF processor with a tiered extraction fallback chain.
//!
//! Tiers, per page:
//!   1. pure-text: the pdf-extract text layer, split on form feeds.
//!      Form feeds are not reliably emitted, so when the split disagrees
//!      with the real page count the text is re-attributed through the
//!      page map while keeping its tag.
//!   2. render-text: lopdf per-page text extraction, used when tier 1
//!      yields nothing at all.
//!   3. block-reconstruction: raw content-stream text operators, for
//!      pages still below the usable-text threshold.
//!   4. ocr: rasterize and recognize, when an OCR engine is configured.
//!
//! A page that never clears the threshold contributes no fragments. A
//! scanned document with no OCR engine therefore processes to an empty
//! list rather than an error.

use super::{
    extraction_failure, hint_for, log_outcome, validate_input, FormatProcessor, ProcessOptions,
};
use crate::error::IngestResult;
use crate::splitter::{TextSplitter, SPLITTING_METHOD};
use docshard_core::{DocumentFormat, Fragment, FragmentEnvelope, MetaValue};
use docshard_ocr::{rasterize_pdf_page, OcrEngine};
use lopdf::content::Content;
use lopdf::Object;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Minimum trimmed characters for a page's text to count as usable.
const MIN_PAGE_TEXT: usize = 50;

/// Text recovered for one page, tagged with the tier that produced it.
struct PageText {
    number: u32,
    text: String,
    method: &'static str,
}

impl PageText {
    fn usable(&self) -> bool {
        self.text.trim().len() >= MIN_PAGE_TEXT
    }
}

/// Processor for PDF documents.
pub struct PdfProcessor {
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl PdfProcessor {
    pub fn new() -> Self {
        Self { ocr: None }
    }

    pub fn with_ocr(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr: Some(ocr) }
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatProcessor for PdfProcessor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn file_type_description(&self) -> &'static str {
        "PDF documents (text layer, reconstruction, and OCR fallback)"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    fn process(&self, path: &Path, options: &ProcessOptions) -> IngestResult<Vec<Fragment>> {
        let started = Instant::now();
        let size = validate_input(path, self)?;

        let bytes = std::fs::read(path)?;
        let pages = self.extract_pages(path, &bytes, size, started)?;

        let format = DocumentFormat::Pdf;
        let geometry = options.resolve_geometry(format);
        let splitter = TextSplitter::new(format, geometry);

        let mut chunks: Vec<(String, BTreeMap<String, MetaValue>)> = Vec::new();
        for page in pages.iter().filter(|p| p.usable()) {
            for chunk in splitter.split(&page.text) {
                let mut extras = BTreeMap::new();
                extras.insert("page".to_string(), MetaValue::Int(page.number as i64));
                extras.insert(
                    "extraction_method".to_string(),
                    MetaValue::Str(page.method.to_string()),
                );
                chunks.push((chunk, extras));
            }
        }

        let fragments = FragmentEnvelope::new(path, format, self.name(), geometry, SPLITTING_METHOD)
            .wrap_with_extras(chunks);

        log_outcome(path, self.name(), size, started, &fragments);
        Ok(fragments)
    }
}

impl PdfProcessor {
    /// Run the tier chain and return per-page text.
    fn extract_pages(
        &self,
        path: &Path,
        bytes: &[u8],
        size: u64,
        started: Instant,
    ) -> IngestResult<Vec<PageText>> {
        let mut pages = tier_pure_text(bytes);
        let doc = lopdf::Document::load_mem(bytes);

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            match &doc {
                Ok(d) => pages = page_map_text(d, "render-text"),
                Err(e) => {
                    return Err(extraction_failure(
                        path,
                        "pdf",
                        size,
                        started,
                        e.to_string(),
                        hint_for(&e.to_string(), "The PDF may be corrupted or not a PDF at all"),
                    ))
                }
            }
        } else if let Ok(d) = &doc {
            // The text layer is accepted, but pdf-extract does not reliably
            // emit form feeds. When the split disagrees with the real page
            // count, re-attribute the text per page through the page map so
            // page numbers stay honest.
            if d.get_pages().len() != pages.len() {
                let remapped = page_map_text(d, "pure-text");
                if remapped.iter().any(|p| !p.text.trim().is_empty()) {
                    pages = remapped;
                }
            }
        }

        if let Ok(doc) = &doc {
            let page_ids: BTreeMap<u32, lopdf::ObjectId> = doc.get_pages();
            for page in pages.iter_mut().filter(|p| !p.usable()) {
                let Some(&page_id) = page_ids.get(&page.number) else {
                    continue;
                };
                if let Some(rebuilt) = reconstruct_page_text(doc, page_id) {
                    if rebuilt.trim().len() > page.text.trim().len() {
                        page.text = rebuilt;
                        page.method = "block-reconstruction";
                    }
                }
            }
        }

        if let Some(ocr) = &self.ocr {
            self.tier_ocr(path, &mut pages, ocr.as_ref());
        }

        let usable = pages.iter().filter(|p| p.usable()).count();
        debug!(
            path = %path.display(),
            pages = pages.len(),
            usable,
            "PDF extraction finished"
        );
        Ok(pages)
    }

    /// OCR pages still below the threshold, keeping whichever text is
    /// longer. OCR trouble degrades to the text already in hand.
    fn tier_ocr(&self, path: &Path, pages: &mut [PageText], ocr: &dyn OcrEngine) {
        if pages.iter().all(|p| p.usable()) {
            return;
        }

        let tmp = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "Could not create temp dir for OCR; skipping OCR tier");
                return;
            }
        };

        for page in pages.iter_mut().filter(|p| !p.usable()) {
            let recognized = rasterize_pdf_page(path, page.number, tmp.path())
                .and_then(|image| ocr.recognize(&image));
            match recognized {
                Ok(text) if text.trim().len() > page.text.trim().len() => {
                    page.text = text;
                    page.method = "ocr";
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        page = page.number,
                        error = %e,
                        "OCR failed for page"
                    );
                }
            }
        }
    }
}

/// Tier 1: the embedded text layer via pdf-extract, one page per form
/// feed. Extraction errors yield no pages so the chain can continue.
fn tier_pure_text(bytes: &[u8]) -> Vec<PageText> {
    let Ok(text) = pdf_extract::extract_text_from_mem(bytes) else {
        return Vec::new();
    };
    text.split('\x0C')
        .enumerate()
        .map(|(i, page)| PageText {
            number: (i + 1) as u32,
            text: page.trim().to_string(),
            method: "pure-text",
        })
        .collect()
}

/// Per-page text through lopdf's page map. Tier 1 uses this to
/// re-attribute an accepted text layer when form feeds are missing;
/// tier 2 uses it as the fallback when the text layer yields nothing.
fn page_map_text(doc: &lopdf::Document, method: &'static str) -> Vec<PageText> {
    doc.get_pages()
        .keys()
        .map(|&number| PageText {
            number,
            text: doc
                .extract_text(&[number])
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            method,
        })
        .collect()
}

/// Tier 3: replay the page's content stream and collect the text-show
/// operators directly.
fn reconstruct_page_text(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> Option<String> {
    let data = doc.get_page_content(page_id).ok()?;
    let content = Content::decode(&data).ok()?;

    let mut out = String::new();
    let mut in_text_block = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => in_text_block = true,
            "ET" => {
                in_text_block = false;
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            "Tj" | "'" | "\"" if in_text_block => {
                for operand in &op.operands {
                    push_pdf_string(operand, &mut out);
                }
                out.push(' ');
            }
            "TJ" if in_text_block => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        push_pdf_string(item, &mut out);
                    }
                }
                out.push(' ');
            }
            "T*" | "Td" | "TD" if in_text_block => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }

    let text = out
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn push_pdf_string(obj: &Object, out: &mut String) {
    if let Object::String(bytes, _) = obj {
        out.push_str(&String::from_utf8_lossy(bytes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::processors::test_support::assert_envelope;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Document, Stream};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Build a PDF with one page per entry; an empty entry yields a page
    /// with no text operators.
    fn build_pdf_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
            ];
            if !text.is_empty() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn build_pdf(text: &str) -> Vec<u8> {
        build_pdf_pages(&[text])
    }

    fn write_pdf(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(&build_pdf(text)).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn extracts_text_from_generated_pdf() {
        let text = "The quarterly report covers revenue, expenses, and staffing \
                    across all four regional offices in considerable detail.";
        let file = write_pdf(text);

        let fragments = PdfProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();

        assert!(!fragments.is_empty());
        assert!(fragments[0].page_content.contains("quarterly report"));
        assert_envelope(&fragments, "pdf", "pdf");
    }

    #[test]
    fn fragments_carry_page_and_extraction_method() {
        let text = "Enough words here to comfortably clear the usable-text \
                    threshold for a single rendered page of output.";
        let file = write_pdf(text);

        let fragments = PdfProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();

        assert_eq!(fragments[0].meta("page"), Some(&MetaValue::Int(1)));
        assert_eq!(
            fragments[0].meta("extraction_method"),
            Some(&MetaValue::Str("pure-text".into()))
        );
    }

    #[test]
    fn page_below_threshold_without_ocr_is_success_empty() {
        let file = write_pdf("tiny");
        let fragments = PdfProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn blank_middle_page_contributes_no_fragments() {
        let first = "Page one carries a full paragraph of genuine body text, \
                     long enough to clear the usable threshold on its own.";
        let third = "Page three likewise carries enough narrative text to \
                     clear the usable threshold without any fallback tier.";
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(&build_pdf_pages(&[first, "", third])).unwrap();
        file.flush().unwrap();

        let fragments = PdfProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();

        let pages: std::collections::BTreeSet<i64> = fragments
            .iter()
            .filter_map(|f| match f.meta("page") {
                Some(MetaValue::Int(p)) => Some(*p),
                _ => None,
            })
            .collect();
        assert!(pages.contains(&1));
        assert!(pages.contains(&3));
        assert!(!pages.contains(&2));
        for f in &fragments {
            assert_eq!(
                f.meta("extraction_method"),
                Some(&MetaValue::Str("pure-text".into()))
            );
        }
    }

    #[test]
    fn corrupted_pdf_is_extraction_error() {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(b"%PDF-1.5 but the rest is garbage").unwrap();
        let result = PdfProcessor::new().process(file.path(), &ProcessOptions::default());
        assert!(matches!(result, Err(IngestError::Extraction { .. })));
    }

    #[test]
    fn zero_byte_pdf_is_empty_error() {
        let file = NamedTempFile::with_suffix(".pdf").unwrap();
        let result = PdfProcessor::new().process(file.path(), &ProcessOptions::default());
        assert!(matches!(result, Err(IngestError::EmptyFile(_))));
    }

    #[test]
    fn pdf_uses_large_chunk_geometry() {
        let text = "A paragraph long enough to pass the usable threshold and land \
                    in exactly one chunk under the default page geometry.";
        let file = write_pdf(text);
        let fragments = PdfProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();
        assert_eq!(fragments[0].meta("chunk_size"), Some(&MetaValue::Int(1800)));
        assert_eq!(
            fragments[0].meta("chunk_overlap"),
            Some(&MetaValue::Int(270))
        );
    }

    #[test]
    fn content_stream_reconstruction_reads_tj_runs() {
        let bytes = build_pdf("Reconstructed run of text operators on one page.");
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let text = reconstruct_page_text(&doc, page_id).unwrap();
        assert!(text.contains("Reconstructed run"));
    }
}
