use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::OcrError;
use crate::tesseract::TextRecognizer;

/// Keep alphanumerics, hyphens, apostrophes and spaces; trim the result.
pub fn sanitize_fragment(fragment: &str) -> String {
    let kept: String = fragment
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '\'' | ' '))
        .collect();
    kept.trim().to_string()
}

/// Pulls word fragments out of an uploaded image.
#[derive(Clone)]
pub struct OcrExtractor {
    recognizer: Arc<dyn TextRecognizer>,
}

impl OcrExtractor {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Recognize `path` and return the sanitized fragments in reading order.
    ///
    /// The first recognized line is always discarded, even when it holds a word.
    pub async fn extract_text(&self, path: &Path) -> Result<Vec<String>, OcrError> {
        if !path.exists() {
            return Err(OcrError::NotFound(path.to_path_buf()));
        }

        let mut lines = self.recognizer.recognize(path).await?;
        if !lines.is_empty() {
            let dropped = lines.remove(0);
            debug!("Dropping first recognized line: {:?}", dropped);
        }

        let fragments: Vec<String> = lines
            .iter()
            .map(|line| sanitize_fragment(line))
            .filter(|fragment| !fragment.is_empty())
            .collect();

        info!(
            "Extracted {} fragments from {}",
            fragments.len(),
            path.display()
        );
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedLines {
        lines: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedLines {
        fn new(lines: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                lines,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextRecognizer for FixedLines {
        async fn recognize(&self, _image: &Path) -> Result<Vec<String>, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.lines.iter().map(|l| l.to_string()).collect())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextRecognizer for Failing {
        async fn recognize(&self, _image: &Path) -> Result<Vec<String>, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }
    }

    fn image_file() -> tempfile::NamedTempFile {
        tempfile::Builder::new().suffix(".png").tempfile().unwrap()
    }

    #[test]
    fn sanitize_fragment_keeps_apostrophes() {
        assert_eq!(sanitize_fragment("word!@#"), "word");
        assert_eq!(sanitize_fragment(" well-known "), "well-known");
        assert_eq!(sanitize_fragment("don't (v.)"), "don't v");
        assert_eq!(sanitize_fragment("•••"), "");
    }

    #[tokio::test]
    async fn first_line_is_dropped_and_fragments_sanitized() {
        let recognizer = FixedLines::new(vec!["Vocabulary", "ocean;", "", "**", "drift 2"]);
        let extractor = OcrExtractor::new(recognizer.clone());
        let file = image_file();

        let fragments = extractor.extract_text(file.path()).await.unwrap();
        assert_eq!(fragments, vec!["ocean", "drift 2"]);
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_line_yields_nothing() {
        let extractor = OcrExtractor::new(FixedLines::new(vec!["ocean"]));
        let file = image_file();
        assert!(extractor.extract_text(file.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_lines_yields_nothing() {
        let extractor = OcrExtractor::new(FixedLines::new(vec![]));
        let file = image_file();
        assert!(extractor.extract_text(file.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_not_found_without_recognizing() {
        let recognizer = FixedLines::new(vec!["a", "b"]);
        let extractor = OcrExtractor::new(recognizer.clone());

        let err = extractor
            .extract_text(Path::new("/nonexistent/wordpack/img.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::NotFound(_)));
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn engine_failure_propagates() {
        let extractor = OcrExtractor::new(Arc::new(Failing));
        let file = image_file();
        let err = extractor.extract_text(file.path()).await.unwrap_err();
        assert!(matches!(err, OcrError::Recognition(_)));
    }
}
