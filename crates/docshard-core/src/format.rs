//! Document format classification.

use serde::{Deserialize, Serialize};

/// Known document formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Rtf,
    Mht,
    Html,
    Pptx,
    Xlsx,
    Xls,
    Csv,
    Epub,
    Text,
    Markdown,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Rtf => "rtf",
            DocumentFormat::Mht => "mht",
            DocumentFormat::Html => "html",
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Xls => "xls",
            DocumentFormat::Csv => "csv",
            DocumentFormat::Epub => "epub",
            DocumentFormat::Text => "text",
            DocumentFormat::Markdown => "markdown",
        }
    }

    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::Doc),
            "rtf" => Some(DocumentFormat::Rtf),
            "mht" | "mhtml" => Some(DocumentFormat::Mht),
            "html" | "htm" => Some(DocumentFormat::Html),
            "pptx" | "ppt" => Some(DocumentFormat::Pptx),
            "xlsx" => Some(DocumentFormat::Xlsx),
            "xls" => Some(DocumentFormat::Xls),
            "csv" => Some(DocumentFormat::Csv),
            "epub" => Some(DocumentFormat::Epub),
            "txt" | "text" | "log" => Some(DocumentFormat::Text),
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            _ => None,
        }
    }

    /// Suffix token appended to a file's base name when deriving a
    /// document id, so same-named files of different formats never collide.
    pub fn id_suffix(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What content sniffing concluded about an ambiguous file.
///
/// Threaded explicitly through dispatch so processors stay stateless; a
/// `.doc` file carrying RTF bytes arrives at the RTF processor with
/// `ContentHint::Rtf` instead of flipping a flag on a long-lived instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentHint {
    /// Genuine legacy-Word binary content.
    Doc,
    /// RTF content (possibly behind a wrong extension).
    Rtf,
    /// Detection ran but nothing decisive was found, or never ran.
    #[default]
    Unknown,
}

impl ContentHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentHint::Doc => "doc",
            ContentHint::Rtf => "rtf",
            ContentHint::Unknown => "unknown",
        }
    }
}
