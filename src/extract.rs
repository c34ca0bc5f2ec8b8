//! Field extraction from recognized text.
//!
//! Two independent, order-preserving regex scans: one for time-of-day
//! tokens (`H:MM`, `HH:MM`, optional `:SS`), one for standalone 4-5 digit
//! fleet identifiers. Extraction is pure; running it twice over the same
//! text yields the same tokens.

use std::sync::OnceLock;

use regex::Regex;

use crate::ocr::RecognizedLine;

/// Time of day: one or two digits, colon, two digits, optional `:SS`.
pub const TIME_PATTERN: &str = r"\b\d{1,2}:\d{2}(?::\d{2})?\b";

/// Fleet identifier: any standalone run of 4-5 digits.
pub const FLEET_ID_PATTERN: &str = r"\b\d{4,5}\b";

static TIME_RE: OnceLock<Regex> = OnceLock::new();
static FLEET_ID_RE: OnceLock<Regex> = OnceLock::new();

fn time_re() -> &'static Regex {
    TIME_RE.get_or_init(|| Regex::new(TIME_PATTERN).unwrap())
}

fn fleet_id_re() -> &'static Regex {
    FLEET_ID_RE.get_or_init(|| Regex::new(FLEET_ID_PATTERN).unwrap())
}

/// One matched token, with the source line it came from when the
/// recognizer preserved layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Index of the recognized line the token was found on, if layout
    /// information was available.
    pub line: Option<usize>,
}

/// The two token sequences produced by scanning recognized text.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    pub times: Vec<Token>,
    pub fleet_ids: Vec<Token>,
}

impl ExtractedFields {
    /// True when every token carries a source line index.
    pub fn has_layout(&self) -> bool {
        let tokens = self.times.iter().chain(self.fleet_ids.iter());
        let mut any = false;
        for token in tokens {
            if token.line.is_none() {
                return false;
            }
            any = true;
        }
        any
    }
}

/// Scan a flat text blob. Tokens carry no line information.
pub fn scan_text(text: &str) -> ExtractedFields {
    ExtractedFields {
        times: matches_in(text, time_re(), None),
        fleet_ids: matches_in(text, fleet_id_re(), None),
    }
}

/// Scan recognized lines, tagging each token with its line index so the
/// pairer can associate tokens that share a row in the source image.
pub fn scan_lines(lines: &[RecognizedLine]) -> ExtractedFields {
    let mut fields = ExtractedFields::default();
    for (index, line) in lines.iter().enumerate() {
        fields
            .times
            .extend(matches_in(&line.text, time_re(), Some(index)));
        fields
            .fleet_ids
            .extend(matches_in(&line.text, fleet_id_re(), Some(index)));
    }
    fields
}

fn matches_in(text: &str, re: &Regex, line: Option<usize>) -> Vec<Token> {
    re.find_iter(text)
        .map(|m| Token {
            text: m.as_str().to_string(),
            line,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_scan_schedule_text() {
        let fields = scan_text("Saida 13:00:00 frota 40167 retorno 15:10:00 frota 32231");
        assert_eq!(texts(&fields.times), ["13:00:00", "15:10:00"]);
        assert_eq!(texts(&fields.fleet_ids), ["40167", "32231"]);
    }

    #[test]
    fn test_time_variants() {
        let fields = scan_text("7:05 e 23:59:59 e 09:30");
        assert_eq!(texts(&fields.times), ["7:05", "23:59:59", "09:30"]);
    }

    #[test]
    fn test_times_do_not_leak_into_fleet_ids() {
        // Digit runs inside a time are at most two digits long.
        let fields = scan_text("13:00:00 40167");
        assert_eq!(texts(&fields.fleet_ids), ["40167"]);
    }

    #[test]
    fn test_fleet_id_must_be_standalone() {
        let fields = scan_text("123 123456 4016 40167");
        assert_eq!(texts(&fields.fleet_ids), ["4016", "40167"]);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let text = "08:00 11111 ruido 9:15 22222 33333";
        let first = scan_text(text);
        let second = scan_text(text);
        assert_eq!(first.times, second.times);
        assert_eq!(first.fleet_ids, second.fleet_ids);
    }

    #[test]
    fn test_scan_lines_tags_line_indices() {
        let lines = vec![
            RecognizedLine::new("13:00:00 40167"),
            RecognizedLine::new("sem dados"),
            RecognizedLine::new("15:10:00 32231"),
        ];
        let fields = scan_lines(&lines);
        assert!(fields.has_layout());
        assert_eq!(fields.times[0].line, Some(0));
        assert_eq!(fields.times[1].line, Some(2));
        assert_eq!(fields.fleet_ids[0].line, Some(0));
        assert_eq!(fields.fleet_ids[1].line, Some(2));
    }

    #[test]
    fn test_flat_text_has_no_layout() {
        let fields = scan_text("13:00 40167");
        assert!(!fields.has_layout());
    }

    #[test]
    fn test_empty_fields_report_no_layout() {
        assert!(!scan_text("nada aqui").has_layout());
    }
}
