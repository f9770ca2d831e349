//! Wordpack OCR - turns uploaded images into candidate vocabulary fragments.

pub mod error;
pub mod extractor;
pub mod tesseract;

pub use error::OcrError;
pub use extractor::{sanitize_fragment, OcrExtractor};
pub use tesseract::{TesseractRecognizer, TextRecognizer};
