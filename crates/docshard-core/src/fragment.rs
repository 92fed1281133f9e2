//! Fragments: the atomic unit persisted to the vector store.

use crate::chunk::ChunkGeometry;
use crate::format::DocumentFormat;
use crate::meta::MetaValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A chunk of extracted text plus its metadata envelope.
///
/// Immutable once emitted; the pipeline hands fragments to storage and
/// does not retain them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub page_content: String,
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Fragment {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Fetch a metadata value by key.
    pub fn meta(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }
}

/// The uniform metadata envelope attached to every fragment of one file.
///
/// Built once per processing call and stamped onto each chunk together
/// with its dense zero-based `chunk_id` and the file's `total_chunks`.
#[derive(Debug, Clone)]
pub struct FragmentEnvelope {
    source: String,
    file_path: String,
    file_type: String,
    processor: String,
    document_id: String,
    document_format: DocumentFormat,
    geometry: ChunkGeometry,
    splitting_method: String,
}

impl FragmentEnvelope {
    pub fn new(
        path: &Path,
        format: DocumentFormat,
        processor: impl Into<String>,
        geometry: ChunkGeometry,
        splitting_method: impl Into<String>,
    ) -> Self {
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        Self {
            source,
            file_path: path.to_string_lossy().to_string(),
            file_type,
            processor: processor.into(),
            document_id: format!("{}_{}", stem, format.id_suffix()),
            document_format: format,
            geometry,
            splitting_method: splitting_method.into(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Stamp the envelope onto a list of chunk texts.
    pub fn wrap(&self, chunks: Vec<String>) -> Vec<Fragment> {
        self.wrap_with_extras(chunks.into_iter().map(|c| (c, BTreeMap::new())).collect())
    }

    /// Stamp the envelope onto chunks carrying per-chunk extra metadata
    /// (e.g. PDF `extraction_method` and `page`).
    ///
    /// Envelope keys win over extractor-supplied keys of the same name so
    /// the schema stays stable regardless of what a parser emitted.
    pub fn wrap_with_extras(
        &self,
        chunks: Vec<(String, BTreeMap<String, MetaValue>)>,
    ) -> Vec<Fragment> {
        let total = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .map(|(index, (content, extras))| {
                let mut metadata = extras;
                metadata.insert("source".into(), self.source.as_str().into());
                metadata.insert("file_path".into(), self.file_path.as_str().into());
                metadata.insert("file_type".into(), self.file_type.as_str().into());
                metadata.insert("processor".into(), self.processor.as_str().into());
                metadata.insert("chunk_id".into(), index.into());
                metadata.insert("document_id".into(), self.document_id.as_str().into());
                metadata.insert("chunk_size".into(), self.geometry.size.into());
                metadata.insert("chunk_overlap".into(), self.geometry.overlap.into());
                metadata.insert(
                    "splitting_method".into(),
                    self.splitting_method.as_str().into(),
                );
                metadata.insert("total_chunks".into(), total.into());
                metadata.insert(
                    "document_format".into(),
                    self.document_format.as_str().into(),
                );
                Fragment {
                    page_content: content,
                    metadata,
                }
            })
            .collect()
    }
}

/// Sanitize extractor-supplied metadata down to storable scalars.
///
/// Non-scalar values are dropped; single-element string lists unwrap.
pub fn sanitize_metadata(raw: &serde_json::Value) -> BTreeMap<String, MetaValue> {
    let mut out = BTreeMap::new();
    if let serde_json::Value::Object(map) = raw {
        for (key, value) in map {
            if let Some(scalar) = MetaValue::sanitize(value) {
                out.insert(key.clone(), scalar);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn envelope() -> FragmentEnvelope {
        FragmentEnvelope::new(
            &PathBuf::from("/data/report.pdf"),
            DocumentFormat::Pdf,
            "pdf",
            ChunkGeometry::new(1800, 270),
            "recursive_character",
        )
    }

    #[test]
    fn chunk_ids_are_dense_and_zero_based() {
        let fragments = envelope().wrap(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(fragments.len(), 3);
        for (i, f) in fragments.iter().enumerate() {
            assert_eq!(f.meta("chunk_id"), Some(&MetaValue::Int(i as i64)));
            assert_eq!(f.meta("total_chunks"), Some(&MetaValue::Int(3)));
        }
    }

    #[test]
    fn document_id_includes_format_suffix() {
        let fragments = envelope().wrap(vec!["a".into()]);
        assert_eq!(
            fragments[0].meta("document_id"),
            Some(&MetaValue::Str("report_pdf".into()))
        );

        let rtf = FragmentEnvelope::new(
            &PathBuf::from("/data/report.rtf"),
            DocumentFormat::Rtf,
            "rtf",
            ChunkGeometry::default(),
            "recursive_character",
        );
        assert_eq!(rtf.document_id(), "report_rtf");
    }

    #[test]
    fn envelope_keys_override_extractor_extras() {
        let mut extras = BTreeMap::new();
        extras.insert("source".to_string(), MetaValue::Str("spoofed".into()));
        extras.insert("page".to_string(), MetaValue::Int(4));
        let fragments = envelope().wrap_with_extras(vec![("text".into(), extras)]);

        assert_eq!(
            fragments[0].meta("source"),
            Some(&MetaValue::Str("report.pdf".into()))
        );
        assert_eq!(fragments[0].meta("page"), Some(&MetaValue::Int(4)));
    }

    #[test]
    fn required_keys_are_present() {
        let fragments = envelope().wrap(vec!["x".into()]);
        for key in [
            "source",
            "file_path",
            "file_type",
            "processor",
            "chunk_id",
            "document_id",
            "chunk_size",
            "chunk_overlap",
            "splitting_method",
            "total_chunks",
            "document_format",
        ] {
            assert!(fragments[0].meta(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn sanitize_drops_composites() {
        let raw = json!({
            "title": "Report",
            "pages": 3,
            "authors": ["solo"],
            "tags": ["a", "b"],
            "nested": {"k": "v"},
        });
        let clean = sanitize_metadata(&raw);
        assert_eq!(clean.get("title"), Some(&MetaValue::Str("Report".into())));
        assert_eq!(clean.get("pages"), Some(&MetaValue::Int(3)));
        assert_eq!(clean.get("authors"), Some(&MetaValue::Str("solo".into())));
        assert!(!clean.contains_key("tags"));
        assert!(!clean.contains_key("nested"));
    }
}
