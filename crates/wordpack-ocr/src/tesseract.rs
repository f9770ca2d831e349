//! Recognition engines.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::OcrError;

/// Engine that reads text lines out of an image file.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognized lines in top-to-bottom reading order.
    async fn recognize(&self, image: &Path) -> Result<Vec<String>, OcrError>;
}

/// Runs the `tesseract` command line tool and reads its stdout.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
    lang: String,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<PathBuf>, lang: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            lang: lang.into(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

/// One line per non-blank output line, trimmed.
fn output_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &Path) -> Result<Vec<String>, OcrError> {
        debug!(
            "Running {} on {} (lang={})",
            self.binary.display(),
            image.display(),
            self.lang
        );

        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .await
            .map_err(|e| {
                OcrError::Recognition(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}
