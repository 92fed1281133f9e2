//! OCR engines.

use crate::error::{OcrError, OcrResult};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// A capability that turns a page image into text.
///
/// Implementations must tolerate concurrent use; the pipeline may run one
/// recognition per in-flight file.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in an image file.
    fn recognize(&self, image_path: &Path) -> OcrResult<String>;

    /// Engine name for logging and fragment metadata.
    fn name(&self) -> &str;
}

/// OCR via the Tesseract CLI.
#[derive(Debug, Clone, Default)]
pub struct TesseractOcr {
    /// Language hint passed as `-l` (e.g. "eng+deu"). None uses the
    /// Tesseract default.
    lang: Option<String>,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self { lang: None }
    }

    pub fn with_lang(lang: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
        }
    }

    /// Construct only if the tesseract binary is installed.
    pub fn if_available() -> Option<Self> {
        which::which("tesseract").ok().map(|_| Self::new())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image_path: &Path) -> OcrResult<String> {
        if !image_path.exists() {
            return Err(OcrError::FileNotFound(image_path.to_path_buf()));
        }

        if which::which("tesseract").is_err() {
            return Err(OcrError::ToolNotFound {
                tool: "tesseract".to_string(),
            });
        }

        debug!("Running OCR on {:?}", image_path);

        let mut cmd = Command::new("tesseract");
        cmd.arg(image_path)
            .arg("stdout") // Output to stdout instead of file
            .args(["--oem", "3"]) // LSTM + legacy engine
            .args(["--psm", "1"]); // Automatic page segmentation with OSD
        if let Some(lang) = &self.lang {
            cmd.args(["-l", lang]);
        }

        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Tesseract sometimes outputs warnings to stderr but still works
            if !output.stdout.is_empty() {
                debug!("Tesseract warning: {}", stderr);
            } else {
                return Err(OcrError::Recognition(stderr.to_string()));
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_image_is_not_found() {
        let engine = TesseractOcr::new();
        let result = engine.recognize(Path::new("/nonexistent/page.png"));
        assert!(matches!(result, Err(OcrError::FileNotFound(_))));
    }

    #[test]
    fn tool_check_does_not_panic() {
        let _ = which::which("tesseract");
        let _ = TesseractOcr::if_available();
    }
}
