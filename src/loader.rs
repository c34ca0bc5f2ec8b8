//! Image loading and validation.
//!
//! Accepts a local file, sniffs its MIME type from content (magic bytes,
//! not the file extension) and rejects anything that is not an image
//! before the recognizer ever runs. Also produces a base64 data URL
//! preview of the raw file bytes - no resizing, no format normalization.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use thiserror::Error;

/// Errors from image loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid file type: {0} (expected image/*)")]
    InvalidFileType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A validated input image, ready for recognition.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Path the image was loaded from.
    pub path: PathBuf,
    /// Detected MIME type, always `image/*`.
    pub mime: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl LoadedImage {
    /// Base64 data URL of the raw file bytes, usable as an inline preview.
    pub fn preview_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

/// Load and validate an image file.
///
/// The MIME type is sniffed from the file content; anything that does not
/// resolve to `image/*` fails with [`LoadError::InvalidFileType`] and no
/// further processing happens.
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    let bytes = std::fs::read(path)?;

    let mime = match infer::get(&bytes) {
        Some(kind) => kind.mime_type().to_string(),
        None => return Err(LoadError::InvalidFileType("unknown".to_string())),
    };

    if !mime.starts_with("image/") {
        return Err(LoadError::InvalidFileType(mime));
    }

    tracing::info!("loaded {} ({}, {} bytes)", path.display(), mime, bytes.len());

    Ok(LoadedImage {
        path: path.to_path_buf(),
        mime,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Enough of a PNG for content sniffing: the 8-byte signature.
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];

    #[test]
    fn test_accepts_png() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PNG_MAGIC).unwrap();

        let image = load_image(file.path()).unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.bytes.len(), PNG_MAGIC.len());
    }

    #[test]
    fn test_rejects_non_image() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4 not an image").unwrap();

        match load_image(file.path()) {
            Err(LoadError::InvalidFileType(mime)) => assert_eq!(mime, "application/pdf"),
            other => panic!("expected InvalidFileType, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_content() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"just some text").unwrap();

        assert!(matches!(
            load_image(file.path()),
            Err(LoadError::InvalidFileType(_))
        ));
    }

    #[test]
    fn test_preview_data_url() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PNG_MAGIC).unwrap();

        let image = load_image(file.path()).unwrap();
        let url = image.preview_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
