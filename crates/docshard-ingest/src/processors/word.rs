//! Word processor: modern `.docx` and legacy `.doc` binaries.

use super::{
    extraction_failure, hint_for, log_outcome, validate_input, FormatProcessor, ProcessOptions,
};
use crate::error::IngestResult;
use crate::splitter::{TextSplitter, SPLITTING_METHOD};
use docshard_core::{sanitize_metadata, DocumentFormat, Fragment, FragmentEnvelope};
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::debug;

/// Processor for Microsoft Word documents.
///
/// `.docx` is parsed in-process; legacy `.doc` binaries go through the
/// external `antiword` tool. Ambiguous `.doc` content (detection said
/// Unknown) is routed here and treated as legacy Word.
pub struct WordProcessor;

impl WordProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WordProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatProcessor for WordProcessor {
    fn name(&self) -> &'static str {
        "word"
    }

    fn file_type_description(&self) -> &'static str {
        "Microsoft Word documents (.docx, legacy .doc)"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["docx", "doc"]
    }

    fn process(&self, path: &Path, options: &ProcessOptions) -> IngestResult<Vec<Fragment>> {
        let started = Instant::now();
        let size = validate_input(path, self)?;

        let ext = crate::detect::extension(path);
        let format = if ext == "docx" {
            DocumentFormat::Docx
        } else {
            DocumentFormat::Doc
        };

        let (content, raw_meta) = match format {
            DocumentFormat::Docx => self.extract_docx(path, size, started)?,
            _ => (self.extract_legacy_doc(path, size, started)?, None),
        };

        let geometry = options.resolve_geometry(format);
        let chunks = TextSplitter::new(format, geometry).split(&content);

        let extras = raw_meta
            .map(|m| sanitize_metadata(&m))
            .unwrap_or_default();
        let fragments = FragmentEnvelope::new(path, format, self.name(), geometry, SPLITTING_METHOD)
            .wrap_with_extras(chunks.into_iter().map(|c| (c, extras.clone())).collect());

        log_outcome(path, self.name(), size, started, &fragments);
        Ok(fragments)
    }
}

impl WordProcessor {
    fn extract_docx(
        &self,
        path: &Path,
        size: u64,
        started: Instant,
    ) -> IngestResult<(String, Option<serde_json::Value>)> {
        let bytes = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&bytes).map_err(|e| {
            extraction_failure(
                path,
                "word",
                size,
                started,
                e.to_string(),
                hint_for(
                    &e.to_string(),
                    "The .docx archive may be corrupted or use unsupported features",
                ),
            )
        })?;

        let text = extract_docx_text(&docx);
        debug!("Extracted {} characters from {:?}", text.len(), path);

        let meta = serde_json::json!({
            "word_count": text.split_whitespace().count(),
        });
        Ok((text, Some(meta)))
    }

    /// Legacy `.doc` extraction through the antiword CLI.
    fn extract_legacy_doc(&self, path: &Path, size: u64, started: Instant) -> IngestResult<String> {
        if which::which("antiword").is_err() {
            return Err(extraction_failure(
                path,
                "word",
                size,
                started,
                "antiword binary not found".to_string(),
                "Install the 'antiword' package to process legacy .doc files".to_string(),
            ));
        }

        let output = Command::new("antiword").arg("-w").arg("0").arg(path).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(extraction_failure(
                path,
                "word",
                size,
                started,
                format!(
                    "antiword exited with status {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
                hint_for(
                    &stderr,
                    "The .doc file may be corrupted, password protected, or not a Word binary",
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Walk the docx body, joining paragraphs with blank lines and table
/// cells with tabs.
fn extract_docx_text(docx: &docx_rs::Docx) -> String {
    let mut text = String::new();

    for child in docx.document.children.iter() {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let para_text = paragraph_text(para);
                if !para_text.is_empty() {
                    if !text.is_empty() {
                        text.push_str("\n\n");
                    }
                    text.push_str(&para_text);
                }
            }
            docx_rs::DocumentChild::Table(table) => {
                for row in &table.rows {
                    let docx_rs::TableChild::TableRow(tr) = row;
                    let mut cells = Vec::new();
                    for cell in &tr.cells {
                        let docx_rs::TableRowChild::TableCell(tc) = cell;
                        let mut cell_text = String::new();
                        for content in &tc.children {
                            if let docx_rs::TableCellContent::Paragraph(p) = content {
                                let pt = paragraph_text(p);
                                if !pt.is_empty() {
                                    if !cell_text.is_empty() {
                                        cell_text.push(' ');
                                    }
                                    cell_text.push_str(&pt);
                                }
                            }
                        }
                        cells.push(cell_text);
                    }
                    if cells.iter().any(|c| !c.is_empty()) {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(&cells.join("\t"));
                    }
                }
            }
            _ => {}
        }
    }

    text.trim().to_string()
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    docx_rs::RunChild::Text(t) => out.push_str(&t.text),
                    docx_rs::RunChild::Tab(_) => out.push('\t'),
                    docx_rs::RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
    }
    out.trim().to_string()
}
