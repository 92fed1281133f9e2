//! Office processor: presentations, spreadsheets, CSV, and EPUB.

use super::{
    extraction_failure, hint_for, log_outcome, validate_input, FormatProcessor, ProcessOptions,
};
use crate::error::IngestResult;
use crate::splitter::{TextSplitter, SPLITTING_METHOD};
use calamine::Reader;
use docshard_core::{sanitize_metadata, DocumentFormat, Fragment, FragmentEnvelope};
use quick_xml::events::Event;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Processor for Office-family formats outside Word: PowerPoint decks,
/// Excel workbooks, CSV exports, and EPUB ebooks.
pub struct OfficeProcessor;

impl OfficeProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OfficeProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatProcessor for OfficeProcessor {
    fn name(&self) -> &'static str {
        "office"
    }

    fn file_type_description(&self) -> &'static str {
        "Office documents (PowerPoint, Excel, CSV, EPUB)"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["pptx", "ppt", "xlsx", "xls", "csv", "epub"]
    }

    fn process(&self, path: &Path, options: &ProcessOptions) -> IngestResult<Vec<Fragment>> {
        let started = Instant::now();
        let size = validate_input(path, self)?;

        let ext = crate::detect::extension(path);
        let format = DocumentFormat::from_extension(&ext).unwrap_or(DocumentFormat::Xlsx);

        let (content, raw_meta) = match format {
            DocumentFormat::Pptx => extract_pptx(path)
                .map_err(|e| self.wrap(path, size, started, e, "presentation"))?,
            DocumentFormat::Xlsx | DocumentFormat::Xls => extract_workbook(path)
                .map_err(|e| self.wrap(path, size, started, e, "workbook"))?,
            DocumentFormat::Csv => {
                extract_csv(path).map_err(|e| self.wrap(path, size, started, e, "CSV file"))?
            }
            DocumentFormat::Epub => {
                extract_epub(path).map_err(|e| self.wrap(path, size, started, e, "EPUB"))?
            }
            _ => unreachable!("extension filter admits only office formats"),
        };

        let geometry = options.resolve_geometry(format);
        let chunks = TextSplitter::new(format, geometry).split(&content);

        let extras = sanitize_metadata(&raw_meta);
        let fragments = FragmentEnvelope::new(path, format, self.name(), geometry, SPLITTING_METHOD)
            .wrap_with_extras(chunks.into_iter().map(|c| (c, extras.clone())).collect());

        log_outcome(path, self.name(), size, started, &fragments);
        Ok(fragments)
    }
}

impl OfficeProcessor {
    fn wrap(
        &self,
        path: &Path,
        size: u64,
        started: Instant,
        message: String,
        what: &str,
    ) -> crate::error::IngestError {
        extraction_failure(
            path,
            self.name(),
            size,
            started,
            message.clone(),
            hint_for(
                &message,
                &format!("The {what} may be corrupted or use unsupported features"),
            ),
        )
    }
}

/// Extract slide text from a `.pptx` archive: walk `ppt/slides/slideN.xml`
/// in deck order and collect `<a:t>` runs.
fn extract_pptx(path: &Path) -> Result<(String, serde_json::Value), String> {
    let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    slide_names.sort_by_key(|name| {
        name.trim_start_matches("ppt/slides/slide")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(0)
    });

    let mut content = String::new();
    let mut slide_count = 0u32;

    for slide_name in slide_names {
        let mut xml = String::new();
        archive
            .by_name(&slide_name)
            .map_err(|e| e.to_string())?
            .read_to_string(&mut xml)
            .map_err(|e| e.to_string())?;

        slide_count += 1;
        let slide_text = xml_text_runs(&xml, b"t");
        if !slide_text.is_empty() {
            content.push_str(&format!("Slide {slide_count}:\n{slide_text}\n\n"));
        }
    }

    debug!("Extracted {} slides from {:?}", slide_count, path);
    let meta = serde_json::json!({ "slides": slide_count });
    Ok((content.trim().to_string(), meta))
}

/// Extract workbook text: one block per sheet, rows tab-joined so the
/// tab-aware splitter can break inside very wide rows.
fn extract_workbook(path: &Path) -> Result<(String, serde_json::Value), String> {
    let mut workbook = calamine::open_workbook_auto(path).map_err(|e| e.to_string())?;

    let mut content = String::new();
    let sheet_names = workbook.sheet_names().to_vec();

    for sheet_name in &sheet_names {
        let Ok(range) = workbook.worksheet_range(sheet_name) else {
            continue;
        };
        let mut sheet_content = format!("Sheet: {sheet_name}\n");
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            if cells.iter().any(|c| !c.is_empty()) {
                sheet_content.push_str(&cells.join("\t"));
                sheet_content.push('\n');
            }
        }
        content.push_str(&sheet_content);
        content.push('\n');
    }

    let meta = serde_json::json!({ "sheets": sheet_names.len() });
    Ok((content.trim().to_string(), meta))
}

fn cell_to_string(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.clone(),
        calamine::Data::Float(f) => f.to_string(),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn extract_csv(path: &Path) -> Result<(String, serde_json::Value), String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let mut content = String::new();
    let mut rows = 0usize;

    if let Ok(headers) = reader.headers() {
        content.push_str(&headers.iter().collect::<Vec<_>>().join("\t"));
        content.push('\n');
    }
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        content.push_str(&record.iter().collect::<Vec<_>>().join("\t"));
        content.push('\n');
        rows += 1;
    }

    let meta = serde_json::json!({ "rows": rows });
    Ok((content.trim().to_string(), meta))
}

/// Extract chapter text from an EPUB archive: walk the XHTML content
/// documents in archive order and strip markup.
fn extract_epub(path: &Path) -> Result<(String, serde_json::Value), String> {
    let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;

    let mut doc_names: Vec<String> = archive
        .file_names()
        .filter(|name| {
            name.ends_with(".xhtml") || name.ends_with(".html") || name.ends_with(".htm")
        })
        .map(|s| s.to_string())
        .collect();
    doc_names.sort();

    let mut content = String::new();
    let mut chapter = 0u32;

    for doc_name in doc_names {
        let mut xml = String::new();
        archive
            .by_name(&doc_name)
            .map_err(|e| e.to_string())?
            .read_to_string(&mut xml)
            .map_err(|e| e.to_string())?;

        let text = html_to_text(&xml);
        if !text.trim().is_empty() {
            chapter += 1;
            content.push_str(&format!("Chapter {chapter}:\n{text}\n\n"));
        }
    }

    let meta = serde_json::json!({ "chapters": chapter });
    Ok((content.trim().to_string(), meta))
}

/// Collect the character data of every element with the given local name.
fn xml_text_runs(xml: &str, element: &[u8]) -> String {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parts: Vec<String> = Vec::new();
    let mut in_element = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == element => {
                in_element = true;
                current.clear();
            }
            Ok(Event::Text(e)) => {
                if in_element {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == element && in_element {
                    if !current.trim().is_empty() {
                        parts.push(current.trim().to_string());
                    }
                    in_element = false;
                } else if e.local_name().as_ref() == b"p" && !parts.is_empty() {
                    parts.push("\n".to_string());
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    parts
        .join(" ")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip HTML/XHTML markup down to visible text via scraper.
pub(crate) fn html_to_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("body").ok();

    let mut content = String::new();
    let texts: Vec<&str> = match selector.as_ref().and_then(|s| document.select(s).next()) {
        Some(body) => body.text().collect(),
        None => document.root_element().text().collect(),
    };
    for text in texts {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(trimmed);
        }
    }
    content
}
