//! OCRS OCR backend implementation.
//!
//! Pure-Rust OCR via the ocrs crate; no external binaries. Models are
//! auto-downloaded on first use. This engine produces a flat text blob
//! with no line layout, so pairing falls back to positional zipping.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, Recognition};
use super::model_utils::{default_model_dir, ensure_model_file, find_model_dir, ModelSpec};

/// Global cached engine; ocrs::OcrEngine is Send+Sync and its methods
/// take &self, so one instance serves all recognitions.
static OCR_ENGINE: OnceLock<ocrs::OcrEngine> = OnceLock::new();

const MODEL_SUBDIR: &str = "ocrs";
const REQUIRED_MODELS: &[&str] = &["text-detection.rten", "text-recognition.rten"];

const DETECTION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten",
    filename: "text-detection.rten",
    size_hint: "2.5 MB",
};

const RECOGNITION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten",
    filename: "text-recognition.rten",
    size_hint: "10 MB",
};

/// OCRS OCR backend (pure Rust).
pub struct OcrsBackend {
    config: OcrConfig,
}

impl OcrsBackend {
    /// Create a new OCRS backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new OCRS backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    fn model_dir(&self) -> Option<PathBuf> {
        find_model_dir(self.config.model_dir.as_deref(), MODEL_SUBDIR, REQUIRED_MODELS)
    }

    /// Locate models, downloading them if necessary.
    fn ensure_models(&self) -> Result<PathBuf, OcrError> {
        if let Some(dir) = self.model_dir() {
            return Ok(dir);
        }

        let model_dir = default_model_dir(MODEL_SUBDIR);
        std::fs::create_dir_all(&model_dir)?;
        ensure_model_file(&DETECTION_MODEL, &model_dir)?;
        ensure_model_file(&RECOGNITION_MODEL, &model_dir)?;
        Ok(model_dir)
    }

    fn engine(&self) -> Result<&'static ocrs::OcrEngine, OcrError> {
        if let Some(engine) = OCR_ENGINE.get() {
            return Ok(engine);
        }

        let model_dir = self.ensure_models()?;

        let detection_model = rten::Model::load_file(model_dir.join("text-detection.rten"))
            .map_err(|e| OcrError::ModelNotFound(format!("detection model: {}", e)))?;
        let recognition_model = rten::Model::load_file(model_dir.join("text-recognition.rten"))
            .map_err(|e| OcrError::ModelNotFound(format!("recognition model: {}", e)))?;

        let engine = ocrs::OcrEngine::new(ocrs::OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| OcrError::RecognitionFailed(format!("failed to create engine: {}", e)))?;

        // If another thread won the race, use its instance.
        let _ = OCR_ENGINE.set(engine);
        OCR_ENGINE
            .get()
            .ok_or_else(|| OcrError::RecognitionFailed("failed to cache engine".to_string()))
    }
}

impl Default for OcrsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for OcrsBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Ocrs
    }

    fn is_available(&self) -> bool {
        // Models auto-download on first use.
        true
    }

    fn availability_hint(&self) -> String {
        match self.model_dir() {
            Some(path) => format!("OCRS models found at {}", path.display()),
            None => format!(
                "OCRS models will be auto-downloaded on first use (~12 MB total) to {}",
                default_model_dir(MODEL_SUBDIR).display()
            ),
        }
    }

    fn recognize(
        &self,
        image_path: &Path,
        progress: &dyn Fn(f32),
    ) -> Result<Recognition, OcrError> {
        let start = Instant::now();
        progress(0.0);

        let engine = self.engine()?;
        progress(0.2);

        let img = image::open(image_path)
            .map_err(|e| OcrError::Image(format!("failed to load image: {}", e)))?;
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let img_source = ocrs::ImageSource::from_bytes(rgb_img.as_raw(), (width, height))
            .map_err(|e| OcrError::Image(format!("failed to convert image: {}", e)))?;

        let input = engine
            .prepare_input(img_source)
            .map_err(|e| OcrError::RecognitionFailed(format!("failed to prepare input: {}", e)))?;
        progress(0.5);

        let text = engine
            .get_text(&input)
            .map_err(|e| OcrError::RecognitionFailed(format!("failed to extract text: {}", e)))?;
        progress(1.0);

        Ok(Recognition {
            text,
            lines: Vec::new(),
            confidence: None,
            backend: OcrBackendType::Ocrs,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}
