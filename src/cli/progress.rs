//! Terminal progress display for extraction runs.

use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::{Phase, PipelineEvent};

/// Progress bar over one pipeline run.
///
/// Maps pipeline events onto the 0-100 display range: preview ends at
/// 10%, recognition spans 10-90, extraction fills 90-100.
pub struct PipelineProgress {
    bar: ProgressBar,
    label: String,
}

impl PipelineProgress {
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_message(label.to_string());
        Self {
            bar,
            label: label.to_string(),
        }
    }

    /// A display that draws nothing (for `--no-progress` and JSON output).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            label: String::new(),
        }
    }

    pub fn update(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::PhaseChanged(phase) => self.phase_changed(*phase),
            PipelineEvent::PreviewReady { .. } => self.bar.set_position(10),
            PipelineEvent::RecognizeProgress(fraction) => {
                let fraction = fraction.clamp(0.0, 1.0);
                self.bar.set_position(10 + (fraction * 80.0).round() as u64);
            }
            PipelineEvent::Recognized { .. } => self.bar.set_position(90),
            PipelineEvent::Paired { .. } => self.bar.set_position(100),
        }
    }

    fn phase_changed(&self, phase: Phase) {
        match phase {
            Phase::Idle => {}
            Phase::LoadingPreview => {
                self.bar.set_position(0);
                self.set_stage("loading preview");
            }
            Phase::Recognizing => self.set_stage("recognizing"),
            Phase::Extracting => self.set_stage("extracting fields"),
            Phase::Done | Phase::Failed => {}
        }
    }

    fn set_stage(&self, stage: &str) {
        self.bar.set_message(format!("{}: {}", self.label, stage));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
