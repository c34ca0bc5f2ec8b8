//! Configuration management.
//!
//! Settings live in a TOML file (`frotascan.toml` under the user config
//! dir, or an explicit `--config` path). Every key has a default, so a
//! missing or partial file is fine; CLI flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::export::SheetOptions;
use crate::ocr::OcrConfig;

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Recognition settings.
    pub ocr: OcrSettings,
    /// Export settings.
    pub export: ExportSettings,
}

/// Recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Language hint passed to the OCR engine.
    pub language: String,
    /// Backend name: "tesseract" or "ocrs".
    pub backend: String,
    /// Directory holding OCR model files (ocrs backend).
    pub model_dir: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
            backend: "tesseract".to_string(),
            model_dir: None,
        }
    }
}

/// Export settings: spreadsheet column titles and widths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub time_column: String,
    pub fleet_column: String,
    pub time_width: f64,
    pub fleet_width: f64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            time_column: "Horário".to_string(),
            fleet_column: "Frota".to_string(),
            time_width: 12.0,
            fleet_width: 10.0,
        }
    }
}

impl Settings {
    /// Backend configuration derived from these settings.
    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            language: self.ocr.language.clone(),
            model_dir: self.ocr.model_dir.clone(),
        }
    }

    /// Sheet layout derived from these settings.
    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            time_column: self.export.time_column.clone(),
            fleet_column: self.export.fleet_column.clone(),
            time_width: self.export.time_width,
            fleet_width: self.export.fleet_width,
        }
    }
}

/// Default settings file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("frotascan").join("frotascan.toml"))
}

/// Load settings.
///
/// An explicit path must exist and parse; the default path is optional
/// and falls back to built-in defaults when absent. Returns the settings
/// together with the path they came from, if any.
pub fn load_settings(path: Option<&Path>) -> Result<(Settings, Option<PathBuf>)> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => match default_config_path() {
            Some(default) if default.exists() => default,
            _ => return Ok((Settings::default(), None)),
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok((settings, Some(path)))
}
