use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("image file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("text recognition failed: {0}")]
    Recognition(String),
}
