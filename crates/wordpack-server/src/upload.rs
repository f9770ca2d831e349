//! Image upload validation and storage.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Largest accepted image, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("missing multipart field 'image'")]
    MissingFile,

    #[error("uploaded file has no usable name")]
    InvalidFileName,

    #[error("unsupported file type '{0}', expected one of jpg, jpeg, png, gif, bmp")]
    UnsupportedExtension(String),

    #[error("unsupported content type '{0}', expected image/*")]
    UnsupportedContentType(String),

    #[error("image exceeds the {} byte limit", MAX_UPLOAD_BYTES)]
    TooLarge,

    #[error("failed to store upload {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Strip directories, turn whitespace into `_` and drop everything outside
/// `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let name: String = base
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        return None;
    }
    Some(name)
}

/// Check name and content type before the body is read; returns the sanitized name.
pub fn validate_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, UploadError> {
    let name = file_name
        .and_then(sanitize_file_name)
        .ok_or(UploadError::InvalidFileName)?;

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext.to_ascii_lowercase()),
        None => (name.as_str(), String::new()),
    };
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::UnsupportedExtension(extension));
    }
    if stem.trim_matches('.').is_empty() {
        return Err(UploadError::InvalidFileName);
    }

    let content_type = content_type.unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(UploadError::UnsupportedContentType(content_type.to_string()));
    }

    Ok(name)
}

/// Write `bytes` under `dir`, creating `dir` if needed.
///
/// The stored file keeps the sanitized stem and extension of `name` with a
/// random suffix, so concurrent uploads of the same name never share a path.
pub async fn persist(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| UploadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let (stem, extension) = name.rsplit_once('.').unwrap_or((name, ""));
    let prefix = format!("{}_", stem);
    let suffix = format!(".{}", extension);
    let target = dir.to_path_buf();
    let contents = bytes.to_vec();

    let stored = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .rand_bytes(8)
            .tempfile_in(&target)?;
        file.write_all(&contents)?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    })
    .await
    .map_err(|e| std::io::Error::other(e.to_string()))
    .and_then(|result| result)
    .map_err(|source| UploadError::Io {
        path: dir.join(name),
        source,
    })?;

    info!("Stored upload {} ({} bytes)", stored.display(), bytes.len());
    Ok(stored)
}
