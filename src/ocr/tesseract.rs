//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line. Recognition runs in TSV output
//! mode first so word-level layout (line numbers) survives for the
//! pairer; if the output is not TSV-shaped, falls back to plain text.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, Recognition, RecognizedLine};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Run Tesseract on an image file, optionally in TSV output mode.
    fn run_tesseract(&self, image_path: &Path, tsv: bool) -> Result<String, OcrError> {
        let mut cmd = Command::new("tesseract");
        cmd.arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language]);
        if tsv {
            cmd.arg("tsv");
        }

        match cmd.output() {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::RecognitionFailed(format!(
                        "tesseract failed: {}",
                        stderr
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        which::which("tesseract").is_ok()
    }

    fn availability_hint(&self) -> String {
        if which::which("tesseract").is_err() {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else {
            format!(
                "Tesseract is available (language '{}'; missing language data installs as \
                 tesseract-ocr-{})",
                self.config.language, self.config.language
            )
        }
    }

    fn recognize(
        &self,
        image_path: &Path,
        progress: &dyn Fn(f32),
    ) -> Result<Recognition, OcrError> {
        let start = Instant::now();
        progress(0.0);

        let raw = self.run_tesseract(image_path, true)?;

        let (text, lines, confidence) = match parse_tsv(&raw) {
            Some((lines, confidence)) => {
                let text = lines
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                (text, lines, confidence)
            }
            None => {
                // Old tesseract builds without the tsv config emit plain text.
                tracing::warn!("tesseract output was not TSV, re-running in plain text mode");
                progress(0.5);
                (self.run_tesseract(image_path, false)?, Vec::new(), None)
            }
        };

        progress(1.0);

        Ok(Recognition {
            text,
            lines,
            confidence,
            backend: OcrBackendType::Tesseract,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Parse Tesseract TSV output into recognized lines and a mean confidence.
///
/// Returns `None` when the input does not look like TSV at all (no header
/// row). A valid TSV with zero words parses to an empty line list.
fn parse_tsv(raw: &str) -> Option<(Vec<RecognizedLine>, Option<f32>)> {
    let mut rows = raw.lines();
    let header = rows.next()?;
    if !header.starts_with("level\t") {
        return None;
    }

    let mut lines: Vec<RecognizedLine> = Vec::new();
    let mut last_key: Option<(u32, u32, u32, u32)> = None;
    let mut conf_sum = 0.0f32;
    let mut conf_count = 0usize;

    for row in rows {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        // Level 5 rows are words; everything else is structural.
        if cols[0] != "5" {
            continue;
        }
        let word = cols[11].trim();
        if word.is_empty() {
            continue;
        }

        let key = (
            cols[1].parse().ok()?,
            cols[2].parse().ok()?,
            cols[3].parse().ok()?,
            cols[4].parse().ok()?,
        );

        if let Ok(conf) = cols[10].parse::<f32>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_count += 1;
            }
        }

        if last_key == Some(key) {
            if let Some(line) = lines.last_mut() {
                line.text.push(' ');
                line.text.push_str(word);
            }
        } else {
            lines.push(RecognizedLine::new(word));
            last_key = Some(key);
        }
    }

    let confidence = if conf_count > 0 {
        Some(conf_sum / conf_count as f32 / 100.0)
    } else {
        None
    };

    Some((lines, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(line: u32, num: u32, conf: &str, text: &str) -> String {
        format!("5\t1\t1\t1\t{}\t{}\t0\t0\t10\t10\t{}\t{}", line, num, conf, text)
    }

    #[test]
    fn test_parse_tsv_groups_words_into_lines() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t".to_string(),
            word(1, 1, "95.0", "13:00:00"),
            word(1, 2, "91.0", "40167"),
            word(2, 1, "88.0", "15:10:00"),
            word(2, 2, "90.0", "32231"),
        ]
        .join("\n");

        let (lines, confidence) = parse_tsv(&tsv).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "13:00:00 40167");
        assert_eq!(lines[1].text, "15:10:00 32231");

        let confidence = confidence.unwrap();
        assert!((confidence - 0.91).abs() < 0.001);
    }

    #[test]
    fn test_parse_tsv_rejects_plain_text() {
        assert!(parse_tsv("13:00:00 40167\n15:10:00 32231").is_none());
    }

    #[test]
    fn test_parse_tsv_skips_negative_confidence() {
        let tsv = [HEADER.to_string(), word(1, 1, "-1", "40167")].join("\n");
        let (lines, confidence) = parse_tsv(&tsv).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(confidence.is_none());
    }

    #[test]
    fn test_parse_tsv_empty_body() {
        let (lines, confidence) = parse_tsv(HEADER).unwrap();
        assert!(lines.is_empty());
        assert!(confidence.is_none());
    }
}
