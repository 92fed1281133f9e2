//! MHT/MHTML web archive processor, covering plain HTML too.

use super::office::html_to_text;
use super::{
    extraction_failure, hint_for, log_outcome, validate_input, FormatProcessor, ProcessOptions,
};
use crate::error::IngestResult;
use crate::splitter::{TextSplitter, SPLITTING_METHOD};
use base64::Engine as _;
use docshard_core::{DocumentFormat, Fragment, FragmentEnvelope};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Processor for saved web pages: MIME-encapsulated archives and bare
/// HTML files.
pub struct MhtProcessor;

impl MhtProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MhtProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatProcessor for MhtProcessor {
    fn name(&self) -> &'static str {
        "mht"
    }

    fn file_type_description(&self) -> &'static str {
        "Web archives and HTML pages (.mht, .mhtml, .html, .htm)"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["mht", "mhtml", "html", "htm"]
    }

    fn process(&self, path: &Path, options: &ProcessOptions) -> IngestResult<Vec<Fragment>> {
        let started = Instant::now();
        let size = validate_input(path, self)?;

        let ext = crate::detect::extension(path);
        let format = DocumentFormat::from_extension(&ext).unwrap_or(DocumentFormat::Html);

        let bytes = std::fs::read(path)?;
        let raw = String::from_utf8_lossy(&bytes);

        let html = if matches!(format, DocumentFormat::Mht) {
            extract_mht_html(&raw).ok_or_else(|| {
                extraction_failure(
                    path,
                    self.name(),
                    size,
                    started,
                    "no HTML part found in MIME archive".to_string(),
                    hint_for(
                        "",
                        "The archive may be malformed or contain no text/html part",
                    ),
                )
            })?
        } else {
            raw.to_string()
        };

        let content = html_to_text(&html);

        let geometry = options.resolve_geometry(format);
        let chunks = TextSplitter::new(format, geometry).split(&content);
        let fragments = FragmentEnvelope::new(path, format, self.name(), geometry, SPLITTING_METHOD)
            .wrap(chunks);

        log_outcome(path, self.name(), size, started, &fragments);
        Ok(fragments)
    }
}

/// Pull the first `text/html` part out of a MIME multipart archive and
/// decode its transfer encoding. Single-part archives (no boundary) fall
/// back to everything after the header block.
fn extract_mht_html(raw: &str) -> Option<String> {
    match boundary_of(raw) {
        Some(boundary) => {
            let delimiter = format!("--{boundary}");
            raw.split(&delimiter)
                .filter_map(decode_mime_part)
                .find(|(content_type, _)| content_type.contains("text/html"))
                .map(|(_, body)| body)
        }
        None => decode_mime_part(raw).map(|(_, body)| body),
    }
}

/// Read the boundary parameter from the top-level Content-Type header.
fn boundary_of(raw: &str) -> Option<String> {
    let header_block = raw.split("\n\n").next().unwrap_or(raw);
    let header_block = header_block.split("\r\n\r\n").next().unwrap_or(header_block);
    for line in header_block.lines() {
        let lower = line.to_lowercase();
        if let Some(pos) = lower.find("boundary=") {
            let value = line[pos + "boundary=".len()..].trim();
            let value = value.trim_start_matches('"');
            let end = value.find(['"', ';']).unwrap_or(value.len());
            let boundary = value[..end].trim();
            if !boundary.is_empty() {
                return Some(boundary.to_string());
            }
        }
    }
    None
}

/// Split one MIME part into (content-type, decoded body).
fn decode_mime_part(part: &str) -> Option<(String, String)> {
    let part = part.trim_start_matches(['\r', '\n']);
    if part.is_empty() || part.starts_with("--") {
        return None;
    }

    let (headers, body) = split_headers(part)?;

    let mut content_type = String::new();
    let mut encoding = String::new();
    for line in headers.lines() {
        let lower = line.to_lowercase();
        if let Some(v) = lower.strip_prefix("content-type:") {
            content_type = v.trim().to_string();
        } else if let Some(v) = lower.strip_prefix("content-transfer-encoding:") {
            encoding = v.trim().to_string();
        }
    }

    let decoded = match encoding.as_str() {
        "quoted-printable" => decode_quoted_printable(body),
        "base64" => {
            let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
            match base64::engine::general_purpose::STANDARD.decode(&compact) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
                Err(e) => {
                    debug!("base64 part failed to decode: {}", e);
                    return None;
                }
            }
        }
        _ => body.to_string(),
    };

    Some((content_type, decoded))
}

fn split_headers(part: &str) -> Option<(&str, &str)> {
    if let Some(pos) = part.find("\r\n\r\n") {
        return Some((&part[..pos], &part[pos + 4..]));
    }
    if let Some(pos) = part.find("\n\n") {
        return Some((&part[..pos], &part[pos + 2..]));
    }
    None
}

/// Decode quoted-printable: `=HH` escapes and soft line breaks.
fn decode_quoted_printable(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    let raw = input.as_bytes();
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'=' && i + 2 < raw.len() {
            // Soft break: = at end of line joins it with the next.
            if raw[i + 1] == b'\r' && raw[i + 2] == b'\n' {
                i += 3;
                continue;
            }
            if raw[i + 1] == b'\n' {
                i += 2;
                continue;
            }
            if let Some(byte) = std::str::from_utf8(&raw[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                bytes.push(byte);
                i += 3;
                continue;
            }
        } else if raw[i] == b'=' && i + 1 < raw.len() && raw[i + 1] == b'\n' {
            i += 2;
            continue;
        }
        bytes.push(raw[i]);
        i += 1;
    }

    String::from_utf8_lossy(&bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::processors::test_support::assert_envelope;
    use docshard_core::MetaValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MHT_SAMPLE: &str = "From: <Saved by test>\r\n\
        Subject: Archived page\r\n\
        Content-Type: multipart/related; boundary=\"----=_Part_01\"\r\n\
        \r\n\
        ------=_Part_01\r\n\
        Content-Type: text/html; charset=utf-8\r\n\
        Content-Transfer-Encoding: quoted-printable\r\n\
        \r\n\
        <html><body><h1>Archive heading</h1><p>Body with caf=C3=A9 text and a =\r\n\
        soft line break.</p></body></html>\r\n\
        ------=_Part_01\r\n\
        Content-Type: image/png\r\n\
        Content-Transfer-Encoding: base64\r\n\
        \r\n\
        aGVsbG8=\r\n\
        ------=_Part_01--\r\n";

    #[test]
    fn mht_archive_extracts_html_part() {
        let mut file = NamedTempFile::with_suffix(".mht").unwrap();
        file.write_all(MHT_SAMPLE.as_bytes()).unwrap();

        let fragments = MhtProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();

        assert_eq!(fragments.len(), 1);
        let text = &fragments[0].page_content;
        assert!(text.contains("Archive heading"));
        assert!(text.contains("café"));
        assert!(text.contains("soft line break"));
        assert!(!text.contains("aGVsbG8"));
        assert_envelope(&fragments, "mht", "mht");
    }

    #[test]
    fn plain_html_processes_directly() {
        let mut file = NamedTempFile::with_suffix(".html").unwrap();
        write!(
            file,
            "<html><body><p>Plain page content without any MIME wrapper.</p></body></html>"
        )
        .unwrap();

        let fragments = MhtProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();

        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].page_content.contains("MIME wrapper"));
        assert_eq!(
            fragments[0].meta("document_format"),
            Some(&MetaValue::Str("html".into()))
        );
    }

    #[test]
    fn html_uses_web_geometry() {
        let mut file = NamedTempFile::with_suffix(".htm").unwrap();
        write!(file, "<html><body><p>Short.</p></body></html>").unwrap();
        let fragments = MhtProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();
        assert_eq!(fragments[0].meta("chunk_size"), Some(&MetaValue::Int(1500)));
        assert_eq!(
            fragments[0].meta("chunk_overlap"),
            Some(&MetaValue::Int(225))
        );
    }

    #[test]
    fn archive_without_html_part_is_extraction_error() {
        let mut file = NamedTempFile::with_suffix(".mht").unwrap();
        write!(
            file,
            "Content-Type: multipart/related; boundary=\"b\"\r\n\r\n--b\r\nContent-Type: image/png\r\n\r\nPNG\r\n--b--\r\n"
        )
        .unwrap();
        let result = MhtProcessor::new().process(file.path(), &ProcessOptions::default());
        assert!(matches!(result, Err(IngestError::Extraction { .. })));
    }

    #[test]
    fn zero_byte_mht_is_empty_error() {
        let file = NamedTempFile::with_suffix(".mht").unwrap();
        let result = MhtProcessor::new().process(file.path(), &ProcessOptions::default());
        assert!(matches!(result, Err(IngestError::EmptyFile(_))));
    }

    #[test]
    fn quoted_printable_decodes_escapes_and_soft_breaks() {
        assert_eq!(decode_quoted_printable("caf=C3=A9"), "café");
        assert_eq!(decode_quoted_printable("one =\r\nline"), "one line");
    }

    #[test]
    fn boundary_parsing_handles_quotes() {
        let raw = "Content-Type: multipart/related; boundary=\"xyz\"\r\n\r\nbody";
        assert_eq!(boundary_of(raw), Some("xyz".to_string()));
        let raw = "Content-Type: multipart/related; boundary=abc\r\n\r\nbody";
        assert_eq!(boundary_of(raw), Some("abc".to_string()));
    }
}
