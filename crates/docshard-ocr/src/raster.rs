//! PDF page rasterization via Poppler's pdftoppm.

use crate::error::{OcrError, OcrResult};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Render one PDF page (1-indexed) to a PNG under `out_dir`.
///
/// Returns the path of the rendered image. 150 DPI is enough for OCR
/// while keeping temp files small.
pub fn rasterize_pdf_page(pdf_path: &Path, page: u32, out_dir: &Path) -> OcrResult<PathBuf> {
    if !pdf_path.exists() {
        return Err(OcrError::FileNotFound(pdf_path.to_path_buf()));
    }

    if which::which("pdftoppm").is_err() {
        return Err(OcrError::ToolNotFound {
            tool: "pdftoppm".to_string(),
        });
    }

    let prefix = out_dir.join(format!("page-{page}"));

    debug!("Rasterizing page {} of {:?}", page, pdf_path);

    let output = Command::new("pdftoppm")
        .arg("-png")
        .args(["-r", "150"])
        .args(["-f", &page.to_string()])
        .args(["-l", &page.to_string()])
        .arg(pdf_path)
        .arg(&prefix)
        .output()?;

    if !output.status.success() {
        return Err(OcrError::ProcessFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    // pdftoppm appends a page-number suffix; accept any width it chose.
    let candidates = [
        PathBuf::from(format!("{}-{}.png", prefix.display(), page)),
        PathBuf::from(format!("{}-{:02}.png", prefix.display(), page)),
        PathBuf::from(format!("{}-{:03}.png", prefix.display(), page)),
    ];
    candidates
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| {
            OcrError::Rasterization(format!("pdftoppm produced no image for page {page}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pdf_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = rasterize_pdf_page(Path::new("/nonexistent/doc.pdf"), 1, dir.path());
        assert!(matches!(result, Err(OcrError::FileNotFound(_))));
    }
}
