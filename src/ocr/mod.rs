//! Optical character recognition.
//!
//! Recognition runs behind the [`OcrBackend`] trait:
//!
//! - **Tesseract**: traditional OCR via the system binary, widely
//!   available, preserves line layout through TSV output (default)
//! - **OCRS**: pure Rust OCR, no external binaries, models
//!   auto-download (feature: ocr-ocrs)

mod backend;
mod tesseract;

#[cfg(feature = "ocr-ocrs")]
mod model_utils;
#[cfg(feature = "ocr-ocrs")]
mod ocrs_backend;

pub use backend::{
    OcrBackend, OcrBackendType, OcrConfig, OcrError, Recognition, RecognizedLine,
};
pub use tesseract::TesseractBackend;

#[cfg(feature = "ocr-ocrs")]
pub use ocrs_backend::OcrsBackend;

use std::sync::Arc;

/// Build the backend named in configuration.
pub fn backend_for(name: &str, config: OcrConfig) -> Result<Arc<dyn OcrBackend>, OcrError> {
    match OcrBackendType::parse(name) {
        Some(OcrBackendType::Tesseract) => Ok(Arc::new(TesseractBackend::with_config(config))),
        #[cfg(feature = "ocr-ocrs")]
        Some(OcrBackendType::Ocrs) => Ok(Arc::new(OcrsBackend::with_config(config))),
        #[cfg(not(feature = "ocr-ocrs"))]
        Some(OcrBackendType::Ocrs) => Err(OcrError::BackendNotAvailable(
            "ocrs backend not compiled (enable the ocr-ocrs feature)".to_string(),
        )),
        None => Err(OcrError::BackendNotAvailable(format!(
            "unknown backend '{}' (available: tesseract, ocrs)",
            name
        ))),
    }
}
