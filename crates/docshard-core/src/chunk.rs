//! Chunk geometry: the (size, overlap) pair governing text splitting.
//!
//! One shared table keyed by [`DocumentFormat`] so processors covering
//! overlapping formats can never drift apart.

use crate::format::DocumentFormat;

/// The (chunk size, chunk overlap) pair for a format, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGeometry {
    pub size: usize,
    pub overlap: usize,
}

impl ChunkGeometry {
    pub const fn new(size: usize, overlap: usize) -> Self {
        Self { size, overlap }
    }

    /// Format-tuned geometry.
    ///
    /// Dense technical text (PDF) gets large windows; slide decks carry
    /// little text per slide and get small ones; tabular content sits in
    /// between. Everything else uses the general-purpose default.
    pub fn for_format(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Pdf => Self::new(1800, 270),
            DocumentFormat::Pptx => Self::new(800, 120),
            DocumentFormat::Xlsx | DocumentFormat::Xls | DocumentFormat::Csv => {
                Self::new(1200, 180)
            }
            DocumentFormat::Epub | DocumentFormat::Html | DocumentFormat::Mht => {
                Self::new(1500, 225)
            }
            _ => Self::default(),
        }
    }

    /// Resolve the effective geometry for one processing call.
    ///
    /// Explicit arguments override the table; either half can be
    /// overridden independently.
    pub fn resolve(
        format: DocumentFormat,
        chunk_size: Option<usize>,
        chunk_overlap: Option<usize>,
    ) -> Self {
        let base = Self::for_format(format);
        Self {
            size: chunk_size.unwrap_or(base.size),
            overlap: chunk_overlap.unwrap_or(base.overlap),
        }
    }
}

impl Default for ChunkGeometry {
    fn default() -> Self {
        Self::new(1000, 150)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_gets_large_windows() {
        let g = ChunkGeometry::for_format(DocumentFormat::Pdf);
        assert_eq!(g.size, 1800);
        assert_eq!(g.overlap, 270);
        // 15% overlap ratio
        assert_eq!(g.overlap * 100 / g.size, 15);
    }

    #[test]
    fn slides_and_sheets_are_tuned() {
        assert_eq!(
            ChunkGeometry::for_format(DocumentFormat::Pptx),
            ChunkGeometry::new(800, 120)
        );
        assert_eq!(
            ChunkGeometry::for_format(DocumentFormat::Xlsx),
            ChunkGeometry::for_format(DocumentFormat::Csv)
        );
    }

    #[test]
    fn explicit_arguments_win() {
        let g = ChunkGeometry::resolve(DocumentFormat::Pdf, Some(500), None);
        assert_eq!(g.size, 500);
        assert_eq!(g.overlap, 270);

        let g = ChunkGeometry::resolve(DocumentFormat::Text, Some(400), Some(40));
        assert_eq!(g, ChunkGeometry::new(400, 40));
    }
}
