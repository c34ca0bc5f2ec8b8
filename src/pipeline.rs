//! Extraction pipeline: load -> recognize -> extract -> pair.
//!
//! The pipeline owns an explicit phase record per run and emits progress
//! events over a channel, keeping the terminal display out of the
//! business logic. Recognition is the single suspension point and runs
//! on a blocking task; a cancellation token is checked before its result
//! is committed, so a stale in-flight recognition can never overwrite
//! newer state.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::extract::{self, ExtractedFields};
use crate::loader::{self, LoadError, LoadedImage};
use crate::ocr::{OcrBackend, OcrError, Recognition};
use crate::pair::{self, PairStrategy, Pairing};

/// Phases of one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingPreview,
    Recognizing,
    Extracting,
    Done,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::LoadingPreview => "loading-preview",
            Phase::Recognizing => "recognizing",
            Phase::Extracting => "extracting",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }
}

/// Events emitted during an extraction run.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    PhaseChanged(Phase),
    /// Image validated; preview available.
    PreviewReady { mime: String, bytes: usize },
    /// Engine progress fraction in `[0,1]`.
    RecognizeProgress(f32),
    /// Recognition committed.
    Recognized {
        chars: usize,
        lines: usize,
        elapsed_ms: u64,
    },
    /// Pairing finished.
    Paired {
        records: usize,
        dropped_times: usize,
        dropped_ids: usize,
        strategy: PairStrategy,
    },
}

/// Errors that end an extraction run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Recognition(#[from] OcrError),

    #[error("cancelled before results were committed")]
    Cancelled,

    #[error("recognizer task failed: {0}")]
    RecognizerPanic(String),
}

/// Everything one successful run produced.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub image: LoadedImage,
    pub recognition: Recognition,
    pub fields: ExtractedFields,
    pub pairing: Pairing,
}

/// The consolidated extraction pipeline, parameterized by OCR backend
/// and pairing strategy.
pub struct ExtractionPipeline {
    backend: Arc<dyn OcrBackend>,
    force_positional: bool,
}

impl ExtractionPipeline {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self {
            backend,
            force_positional: false,
        }
    }

    /// Force index-based pairing even when line layout is available.
    pub fn force_positional(mut self, force: bool) -> Self {
        self.force_positional = force;
        self
    }

    /// Run the full pipeline on one image.
    ///
    /// On error the phase record moves to `Failed` and then back to
    /// `Idle`; nothing is committed.
    pub async fn run(
        &self,
        image_path: &Path,
        events: mpsc::Sender<PipelineEvent>,
        cancel: CancellationToken,
    ) -> Result<ExtractionOutcome, PipelineError> {
        match self.run_inner(image_path, &events, &cancel).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let _ = events.send(PipelineEvent::PhaseChanged(Phase::Failed)).await;
                let _ = events.send(PipelineEvent::PhaseChanged(Phase::Idle)).await;
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        image_path: &Path,
        events: &mpsc::Sender<PipelineEvent>,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome, PipelineError> {
        let _ = events
            .send(PipelineEvent::PhaseChanged(Phase::LoadingPreview))
            .await;

        // Rejects non-images before the recognizer is ever invoked.
        let image = loader::load_image(image_path)?;
        let _ = events
            .send(PipelineEvent::PreviewReady {
                mime: image.mime.clone(),
                bytes: image.bytes.len(),
            })
            .await;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let _ = events
            .send(PipelineEvent::PhaseChanged(Phase::Recognizing))
            .await;

        let backend = Arc::clone(&self.backend);
        let path = image.path.clone();
        let progress_events = events.clone();
        let recognition = tokio::task::spawn_blocking(move || {
            let progress = |fraction: f32| {
                let _ = progress_events.blocking_send(PipelineEvent::RecognizeProgress(fraction));
            };
            backend.recognize(&path, &progress)
        })
        .await
        .map_err(|e| PipelineError::RecognizerPanic(e.to_string()))??;

        // The commit barrier: a cancelled run discards the recognition.
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let _ = events
            .send(PipelineEvent::Recognized {
                chars: recognition.text.chars().count(),
                lines: recognition.lines.len(),
                elapsed_ms: recognition.elapsed_ms,
            })
            .await;
        let _ = events
            .send(PipelineEvent::PhaseChanged(Phase::Extracting))
            .await;

        let fields = if recognition.has_layout() {
            extract::scan_lines(&recognition.lines)
        } else {
            extract::scan_text(&recognition.text)
        };
        let pairing = pair::pair(&fields, self.force_positional);

        let _ = events
            .send(PipelineEvent::Paired {
                records: pairing.records.len(),
                dropped_times: pairing.dropped_times,
                dropped_ids: pairing.dropped_ids,
                strategy: pairing.strategy,
            })
            .await;
        let _ = events.send(PipelineEvent::PhaseChanged(Phase::Done)).await;

        Ok(ExtractionOutcome {
            image,
            recognition,
            fields,
            pairing,
        })
    }
}
