//! docshard-ocr - Optical character recognition for scanned documents.
//!
//! OCR is an optional capability: the PDF processor receives an
//! `Arc<dyn OcrEngine>` at construction, or nothing at all. "OCR not
//! configured" is an absent value, not a global flag.
//!
//! The default implementation shells out to the `tesseract` CLI; page
//! rasterization uses Poppler's `pdftoppm`. Both must be installed on the
//! system for the OCR tier to function.

mod error;
mod raster;
mod tesseract;

pub use error::{OcrError, OcrResult};
pub use raster::rasterize_pdf_page;
pub use tesseract::{OcrEngine, TesseractOcr};

/// Check whether the external tools the OCR tier relies on are available.
pub fn check_dependencies() -> Vec<(&'static str, bool)> {
    vec![
        ("tesseract", which::which("tesseract").is_ok()),
        ("pdftoppm", which::which("pdftoppm").is_ok()),
    ]
}
