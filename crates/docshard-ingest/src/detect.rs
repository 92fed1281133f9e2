//! Content sniffing for ambiguous files.
//!
//! Files with a `.doc` extension are routinely RTF documents renamed by
//! export tools. Classification inspects the leading bytes instead of
//! trusting the extension, and never fails: any I/O or decode problem
//! downgrades to [`ContentHint::Unknown`] so detection can never block
//! ingestion.

use docshard_core::ContentHint;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Window of leading bytes inspected.
const HEADER_WINDOW: usize = 2048;

/// Fixed 8-byte OLE2 compound-document signature.
const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// RTF markers voted on when the literal opening token is absent.
const RTF_MARKERS: [&str; 6] = [
    "\\rtf1",
    "\\*\\generator",
    "\\ansi",
    "\\deff",
    "\\fonttbl",
    "\\colortbl",
];

/// Word-specific markers checked in both raw bytes and decoded text.
const WORD_MARKERS: [&str; 3] = ["Microsoft Word", "MSWordDoc", "Word.Document"];

/// Classify a file's true format from its leading bytes.
///
/// Ordered, short-circuiting:
/// 1. a literal `{\rtf` opening token wins outright;
/// 2. the OLE2 magic wins over RTF marker text occurring later in the
///    header;
/// 3. two or more RTF markers vote for RTF;
/// 4. Word markers vote for DOC;
/// 5. anything else, including read failures, is Unknown.
pub fn detect_content(path: &Path) -> ContentHint {
    let header = match read_header(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Content detection failed for {:?}: {}", path, e);
            return ContentHint::Unknown;
        }
    };

    classify_header(&header)
}

/// Classification over an in-memory header window.
pub fn classify_header(header: &[u8]) -> ContentHint {
    let decoded = String::from_utf8_lossy(header);

    if decoded.trim_start().starts_with("{\\rtf") {
        return ContentHint::Rtf;
    }

    if header.len() >= OLE2_MAGIC.len() && header[..OLE2_MAGIC.len()] == OLE2_MAGIC {
        return ContentHint::Doc;
    }

    let rtf_votes = RTF_MARKERS
        .iter()
        .filter(|marker| decoded.contains(*marker))
        .count();
    if rtf_votes >= 2 {
        return ContentHint::Rtf;
    }

    let raw_hit = WORD_MARKERS
        .iter()
        .any(|marker| contains_bytes(header, marker.as_bytes()));
    if raw_hit || WORD_MARKERS.iter().any(|marker| decoded.contains(marker)) {
        return ContentHint::Doc;
    }

    ContentHint::Unknown
}

/// True when the RTF processor should handle this path: either it is a
/// real `.rtf` file, or a `.doc` whose content sniffs as RTF.
pub fn should_use_rtf_processor(path: &Path) -> bool {
    match extension(path).as_str() {
        "rtf" => true,
        "doc" => detect_content(path) == ContentHint::Rtf,
        _ => false,
    }
}

/// True when the Word processor should handle this path: every `.docx`,
/// plus `.doc` files whose content sniffs as genuine Word or stays
/// undetermined (ambiguous content defaults to Word).
pub fn should_use_word_processor(path: &Path) -> bool {
    match extension(path).as_str() {
        "docx" => true,
        "doc" => matches!(
            detect_content(path),
            ContentHint::Doc | ContentHint::Unknown
        ),
        _ => false,
    }
}

fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = vec![0u8; HEADER_WINDOW];
    let mut filled = 0;
    loop {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == buf.len() {
            break;
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub(crate) fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_doc(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".doc").unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn rtf_opening_token_wins_even_with_doc_extension() {
        let file = write_doc(b"{\\rtf1\\ansi\\deff0 Hello from an exported file}");
        assert_eq!(detect_content(file.path()), ContentHint::Rtf);
        assert!(should_use_rtf_processor(file.path()));
        assert!(!should_use_word_processor(file.path()));
    }

    #[test]
    fn ole2_magic_beats_rtf_markers_in_body() {
        let mut bytes = Vec::from(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1][..]);
        bytes.extend_from_slice(b"garbage \\ansi more garbage \\fonttbl tail");
        assert_eq!(classify_header(&bytes), ContentHint::Doc);
    }

    #[test]
    fn rtf_marker_voting_needs_two() {
        assert_eq!(
            classify_header(b"prefix \\ansi only one marker"),
            ContentHint::Unknown
        );
        assert_eq!(
            classify_header(b"prefix \\ansi and \\fonttbl present"),
            ContentHint::Rtf
        );
    }

    #[test]
    fn word_text_marker_classifies_as_doc() {
        assert_eq!(
            classify_header(b"\x01\x02 MSWordDoc \x03\x04"),
            ContentHint::Doc
        );
        assert_eq!(
            classify_header("header Word.Document.8 trailer".as_bytes()),
            ContentHint::Doc
        );
    }

    #[test]
    fn unreadable_file_is_unknown() {
        assert_eq!(
            detect_content(Path::new("/nonexistent/mystery.doc")),
            ContentHint::Unknown
        );
    }

    #[test]
    fn docx_always_routes_to_word() {
        // No file on disk required: the extension short-circuits.
        assert!(should_use_word_processor(Path::new("missing.docx")));
    }

    #[test]
    fn ambiguous_doc_defaults_to_word() {
        let file = write_doc(b"no recognizable markers at all");
        assert!(should_use_word_processor(file.path()));
        assert!(!should_use_rtf_processor(file.path()));
    }

    #[test]
    fn genuine_ole2_doc_routes_to_word() {
        let mut bytes = Vec::from(&OLE2_MAGIC[..]);
        bytes.extend_from_slice(&[0u8; 64]);
        let file = write_doc(&bytes);
        assert_eq!(detect_content(file.path()), ContentHint::Doc);
        assert!(should_use_word_processor(file.path()));
    }
}
