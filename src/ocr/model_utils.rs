//! Model file management for OCR backends that ship neural models.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::OcrError;

/// A downloadable model file.
pub struct ModelSpec {
    /// URL to download from.
    pub url: &'static str,
    /// Filename to save as.
    pub filename: &'static str,
    /// Human-readable size for progress messages.
    pub size_hint: &'static str,
}

/// Directories searched for model files, most specific first.
pub fn candidate_dirs(configured: Option<&Path>, subdir: &str) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(path) = configured {
        dirs.push(path.to_path_buf());
    }
    if let Some(data) = dirs::data_dir() {
        dirs.push(data.join(subdir).join("models"));
    }
    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(format!(".{}", subdir)).join("models"));
    }
    dirs
}

/// Find a directory containing all of `required`, if any.
pub fn find_model_dir(configured: Option<&Path>, subdir: &str, required: &[&str]) -> Option<PathBuf> {
    candidate_dirs(configured, subdir)
        .into_iter()
        .find(|dir| required.iter().all(|file| dir.join(file).exists()))
}

/// Default directory models are downloaded into.
pub fn default_model_dir(subdir: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(subdir)
        .join("models")
}

/// Download a model file into `model_dir` unless it already exists.
pub fn ensure_model_file(spec: &ModelSpec, model_dir: &Path) -> Result<(), OcrError> {
    let dest = model_dir.join(spec.filename);
    if dest.exists() {
        return Ok(());
    }
    eprintln!("Downloading {} (~{})...", spec.filename, spec.size_hint);
    download_file(spec.url, &dest)
}

/// Fetch a URL to a local path using curl, falling back to wget.
fn download_file(url: &str, dest: &Path) -> Result<(), OcrError> {
    let status = Command::new("curl")
        .args(["-fSL", "--progress-bar", "-o"])
        .arg(dest)
        .arg(url)
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(_) => {
            let _ = std::fs::remove_file(dest);
            Err(OcrError::RecognitionFailed(format!(
                "failed to download {}",
                url
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let status = Command::new("wget")
                .args(["-q", "--show-progress", "-O"])
                .arg(dest)
                .arg(url)
                .status();
            match status {
                Ok(status) if status.success() => Ok(()),
                Ok(_) => {
                    let _ = std::fs::remove_file(dest);
                    Err(OcrError::RecognitionFailed(format!(
                        "failed to download {}",
                        url
                    )))
                }
                Err(_) => Err(OcrError::BackendNotAvailable(
                    "neither curl nor wget found; install one to download models".to_string(),
                )),
            }
        }
        Err(e) => Err(OcrError::Io(e)),
    }
}
