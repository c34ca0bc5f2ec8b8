//! OCR backend abstraction.
//!
//! Recognition runs behind a trait so the pipeline can be driven by the
//! system Tesseract binary (default), the pure-Rust ocrs engine
//! (feature: ocr-ocrs), or a test double.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    Tesseract,
    /// Pure Rust OCR engine (ocrs crate).
    Ocrs,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::Ocrs => "ocrs",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "ocrs" => Some(OcrBackendType::Ocrs),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for OCR backends.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Recognition language (Tesseract language code, e.g. "por", "eng").
    pub language: String,
    /// Path to model files, for backends that need them.
    pub model_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
            model_dir: None,
        }
    }
}

/// One recognized text line, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedLine {
    pub text: String,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Result of a recognition run.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Full recognized text.
    pub text: String,
    /// Line-level layout, empty when the engine only produced a flat blob.
    pub lines: Vec<RecognizedLine>,
    /// Mean word confidence in `[0,1]`, if the engine reports it.
    /// Captured for diagnostics; extraction does not use it.
    pub confidence: Option<f32>,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub elapsed_ms: u64,
}

impl Recognition {
    /// True when line-level layout survived recognition.
    pub fn has_layout(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Trait for OCR backends.
///
/// `recognize` reports coarse progress in `[0,1]` through the callback;
/// the pipeline display maps that into its own percent range.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend can run (binaries installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn recognize(
        &self,
        image_path: &Path,
        progress: &dyn Fn(f32),
    ) -> Result<Recognition, OcrError>;
}
