//! RTF processor.
//!
//! Handles genuine `.rtf` files plus `.doc` files whose content sniffing
//! identified an RTF body behind the wrong extension (the registry routes
//! those here with `ContentHint::Rtf`).

use super::{extraction_failure, log_outcome, validate_input, FormatProcessor, ProcessOptions};
use crate::error::IngestResult;
use crate::splitter::{TextSplitter, SPLITTING_METHOD};
use docshard_core::{ContentHint, DocumentFormat, Fragment, FragmentEnvelope};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Processor for Rich Text Format documents.
pub struct RtfProcessor;

impl RtfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RtfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatProcessor for RtfProcessor {
    fn name(&self) -> &'static str {
        "rtf"
    }

    fn file_type_description(&self) -> &'static str {
        "Rich Text Format documents (including misnamed .doc files)"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["rtf", "doc"]
    }

    fn is_supported_file(&self, path: &Path) -> bool {
        // `.doc` is claimed only when content sniffing says so; the
        // registry performs that check. Standalone use accepts `.rtf`.
        crate::detect::extension(path) == "rtf" || crate::detect::should_use_rtf_processor(path)
    }

    fn process(&self, path: &Path, options: &ProcessOptions) -> IngestResult<Vec<Fragment>> {
        let started = Instant::now();
        let size = validate_input(path, self)?;

        if options.content_hint == ContentHint::Rtf {
            debug!("Processing {:?} as RTF per content hint", path);
        }

        let bytes = std::fs::read(path)?;
        let raw = String::from_utf8_lossy(&bytes);

        if !raw.trim_start().starts_with("{\\rtf") {
            return Err(extraction_failure(
                path,
                self.name(),
                size,
                started,
                "missing RTF opening token".to_string(),
                "The file does not look like RTF; it may be corrupted or misclassified"
                    .to_string(),
            ));
        }

        let content = rtf_to_text(&raw);

        let format = DocumentFormat::Rtf;
        let geometry = options.resolve_geometry(format);
        let chunks = TextSplitter::new(format, geometry).split(&content);
        let fragments = FragmentEnvelope::new(path, format, self.name(), geometry, SPLITTING_METHOD)
            .wrap(chunks);

        log_outcome(path, self.name(), size, started, &fragments);
        Ok(fragments)
    }
}

/// Destination groups whose content never contributes body text.
const SKIP_GROUPS: [&str; 6] = [
    "\\fonttbl",
    "\\colortbl",
    "\\stylesheet",
    "\\info",
    "\\pict",
    "\\*",
];

/// Strip RTF control structure down to plain text.
fn rtf_to_text(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() / 2);
    let mut depth: usize = 0;
    // Depth at which a skipped destination group started, if any.
    let mut skip_from: Option<usize> = None;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '{' => {
                depth += 1;
                if skip_from.is_none() && starts_skip_group(&chars[i + 1..]) {
                    skip_from = Some(depth);
                }
                i += 1;
            }
            '}' => {
                if skip_from == Some(depth) {
                    skip_from = None;
                }
                depth = depth.saturating_sub(1);
                i += 1;
            }
            '\\' => {
                let (emitted, consumed) = control_word(&chars[i..]);
                if skip_from.is_none() {
                    out.push_str(&emitted);
                }
                i += consumed;
            }
            '\r' | '\n' => i += 1, // raw newlines carry no meaning in RTF
            c => {
                if skip_from.is_none() {
                    out.push(c);
                }
                i += 1;
            }
        }
    }

    collapse_blank_lines(&out)
}

fn starts_skip_group(rest: &[char]) -> bool {
    let prefix: String = rest.iter().take(12).collect();
    SKIP_GROUPS.iter().any(|g| prefix.starts_with(g))
}

/// Parse one control sequence starting at a backslash. Returns the text
/// it contributes and the number of chars consumed.
fn control_word(chars: &[char]) -> (String, usize) {
    // chars[0] == '\\'
    if chars.len() < 2 {
        return (String::new(), 1);
    }
    match chars[1] {
        '\\' | '{' | '}' => (chars[1].to_string(), 2),
        '~' => (" ".to_string(), 2),
        '_' => ("-".to_string(), 2),
        '\'' => {
            // \'hh hex-escaped byte, interpreted as Latin-1.
            if chars.len() >= 4 {
                let hex: String = chars[2..4].iter().collect();
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    return ((byte as char).to_string(), 4);
                }
            }
            (String::new(), 2)
        }
        c if c.is_ascii_alphabetic() => {
            let mut j = 1;
            while j < chars.len() && chars[j].is_ascii_alphabetic() {
                j += 1;
            }
            let word: String = chars[1..j].iter().collect();

            // Optional signed numeric parameter.
            let mut param = String::new();
            if j < chars.len() && (chars[j] == '-' || chars[j].is_ascii_digit()) {
                param.push(chars[j]);
                j += 1;
                while j < chars.len() && chars[j].is_ascii_digit() {
                    param.push(chars[j]);
                    j += 1;
                }
            }
            // A single trailing space terminates the control word.
            if j < chars.len() && chars[j] == ' ' {
                j += 1;
            }

            let text = match word.as_str() {
                "par" | "line" | "sect" | "page" => "\n".to_string(),
                "cell" | "tab" => "\t".to_string(),
                "row" => "\n".to_string(),
                "emdash" | "endash" => "-".to_string(),
                "bullet" => "*".to_string(),
                "lquote" | "rquote" => "'".to_string(),
                "ldblquote" | "rdblquote" => "\"".to_string(),
                "u" => {
                    // \uN with a negative-wrapped code point; the char that
                    // follows is the ANSI fallback and is dropped.
                    let mut consumed_fallback = 0;
                    if j < chars.len() && chars[j] != '\\' && chars[j] != '{' && chars[j] != '}' {
                        consumed_fallback = 1;
                    }
                    let code = param.parse::<i32>().unwrap_or(0);
                    let code = if code < 0 { code + 65536 } else { code };
                    let text = char::from_u32(code as u32)
                        .map(|c| c.to_string())
                        .unwrap_or_default();
                    return (text, j + consumed_fallback);
                }
                _ => String::new(),
            };
            (text, j)
        }
        _ => (String::new(), 2),
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = Vec::new();
    let mut last_blank = false;
    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.trim().is_empty();
        if !(blank && last_blank) {
            out.push(line.to_string());
        }
        last_blank = blank;
    }
    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::processors::test_support::assert_envelope;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn strips_control_words() {
        let rtf = "{\\rtf1\\ansi\\deff0 Hello \\b bold\\b0  world\\par second line}";
        let text = rtf_to_text(rtf);
        assert!(text.contains("Hello"));
        assert!(text.contains("bold"));
        assert!(text.contains("world"));
        assert!(text.contains("second line"));
        assert!(!text.contains("\\b"));
    }

    #[test]
    fn font_and_color_tables_are_dropped() {
        let rtf = "{\\rtf1\\ansi{\\fonttbl{\\f0 Times New Roman;}}{\\colortbl;\\red0;}Body text}";
        let text = rtf_to_text(rtf);
        assert!(text.contains("Body text"));
        assert!(!text.contains("Times New Roman"));
        assert!(!text.contains("red0"));
    }

    #[test]
    fn hex_escapes_decode_as_latin1() {
        let rtf = "{\\rtf1 caf\\'e9 au lait}";
        assert!(rtf_to_text(rtf).contains("café"));
    }

    #[test]
    fn unicode_escapes_decode() {
        let rtf = "{\\rtf1 snowman \\u9731? here}";
        assert!(rtf_to_text(rtf).contains('☃'));
    }

    #[test]
    fn processes_rtf_file_end_to_end() {
        let mut file = NamedTempFile::with_suffix(".rtf").unwrap();
        write!(
            file,
            "{{\\rtf1\\ansi\\deff0 First paragraph.\\par\\par Second paragraph.}}"
        )
        .unwrap();

        let fragments = RtfProcessor::new()
            .process(file.path(), &ProcessOptions::default())
            .unwrap();

        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].page_content.contains("First paragraph."));
        assert_envelope(&fragments, "rtf", "rtf");
    }

    #[test]
    fn misnamed_doc_with_rtf_body_processes() {
        let mut file = NamedTempFile::with_suffix(".doc").unwrap();
        write!(file, "{{\\rtf1\\ansi\\deff0 Exported from legacy tooling.}}").unwrap();

        let fragments = RtfProcessor::new()
            .process(
                file.path(),
                &ProcessOptions::default().with_hint(docshard_core::ContentHint::Rtf),
            )
            .unwrap();

        assert_eq!(fragments.len(), 1);
        // Format suffix reflects RTF handling, not the lying extension.
        assert!(fragments[0]
            .meta("document_id")
            .is_some_and(|id| id.to_display_string().ends_with("_rtf")));
    }

    #[test]
    fn non_rtf_body_is_an_extraction_error() {
        let mut file = NamedTempFile::with_suffix(".rtf").unwrap();
        write!(file, "just plain text, no rtf header").unwrap();
        let result = RtfProcessor::new().process(file.path(), &ProcessOptions::default());
        assert!(matches!(result, Err(IngestError::Extraction { .. })));
    }

    #[test]
    fn zero_byte_rtf_is_empty_error() {
        let file = NamedTempFile::with_suffix(".rtf").unwrap();
        let result = RtfProcessor::new().process(file.path(), &ProcessOptions::default());
        assert!(matches!(result, Err(IngestError::EmptyFile(_))));
    }
}
