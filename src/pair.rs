//! Pairing time tokens with fleet-id tokens into schedule records.
//!
//! Two strategies:
//!
//! - **Line-aware** (preferred): tokens that share a recognized line are
//!   paired with each other, so one spurious digit run elsewhere in the
//!   image cannot shift every subsequent row.
//! - **Positional** (fallback): the two sequences are zipped by index up
//!   to the shorter length. Used when the recognizer produced no layout,
//!   or when forced.
//!
//! Either way, tokens that find no counterpart are dropped and counted;
//! the drop counts surface in the pairing summary and the log.

use std::collections::BTreeMap;

use crate::extract::{ExtractedFields, Token};
use crate::models::ScheduleRecord;

/// Which pairing strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStrategy {
    /// Tokens paired within their shared source line.
    LineAware,
    /// Sequences zipped by index, truncated to the shorter list.
    Positional,
}

impl PairStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairStrategy::LineAware => "line",
            PairStrategy::Positional => "positional",
        }
    }
}

/// Outcome of a pairing pass.
#[derive(Debug, Clone)]
pub struct Pairing {
    pub records: Vec<ScheduleRecord>,
    pub strategy: PairStrategy,
    /// Time tokens that found no fleet-id counterpart.
    pub dropped_times: usize,
    /// Fleet-id tokens that found no time counterpart.
    pub dropped_ids: usize,
}

impl Pairing {
    pub fn dropped(&self) -> usize {
        self.dropped_times + self.dropped_ids
    }
}

/// Pair extracted fields into schedule records.
///
/// Uses the line-aware strategy whenever every token carries a source
/// line; falls back to positional zipping otherwise, or when
/// `force_positional` is set.
pub fn pair(fields: &ExtractedFields, force_positional: bool) -> Pairing {
    let pairing = if !force_positional && fields.has_layout() {
        pair_by_line(fields)
    } else {
        pair_positional(fields)
    };

    if pairing.dropped() > 0 {
        tracing::warn!(
            "pairing dropped {} time token(s) and {} fleet-id token(s) ({} strategy)",
            pairing.dropped_times,
            pairing.dropped_ids,
            pairing.strategy.as_str()
        );
    }

    pairing
}

/// Zip the two sequences by index up to the shorter length.
fn pair_positional(fields: &ExtractedFields) -> Pairing {
    let n = fields.times.len().min(fields.fleet_ids.len());

    let records = fields.times[..n]
        .iter()
        .zip(&fields.fleet_ids[..n])
        .map(|(time, id)| ScheduleRecord::new(&time.text, &id.text))
        .collect();

    Pairing {
        records,
        strategy: PairStrategy::Positional,
        dropped_times: fields.times.len() - n,
        dropped_ids: fields.fleet_ids.len() - n,
    }
}

/// Pair tokens line by line, in source order.
fn pair_by_line(fields: &ExtractedFields) -> Pairing {
    let mut lines: BTreeMap<usize, (Vec<&Token>, Vec<&Token>)> = BTreeMap::new();

    for token in &fields.times {
        if let Some(line) = token.line {
            lines.entry(line).or_default().0.push(token);
        }
    }
    for token in &fields.fleet_ids {
        if let Some(line) = token.line {
            lines.entry(line).or_default().1.push(token);
        }
    }

    let mut records = Vec::new();
    let mut dropped_times = 0;
    let mut dropped_ids = 0;

    for (times, ids) in lines.into_values() {
        let n = times.len().min(ids.len());
        for (time, id) in times[..n].iter().zip(&ids[..n]) {
            records.push(ScheduleRecord::new(&time.text, &id.text));
        }
        dropped_times += times.len() - n;
        dropped_ids += ids.len() - n;
    }

    Pairing {
        records,
        strategy: PairStrategy::LineAware,
        dropped_times,
        dropped_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{scan_lines, scan_text};
    use crate::ocr::RecognizedLine;

    #[test]
    fn test_equal_counts_pair_by_index() {
        let fields = scan_text("13:00:00 ruido 40167 mais 15:10:00 texto 32231");
        let pairing = pair(&fields, false);

        assert_eq!(pairing.strategy, PairStrategy::Positional);
        assert_eq!(
            pairing.records,
            vec![
                ScheduleRecord::new("13:00:00", "40167"),
                ScheduleRecord::new("15:10:00", "32231"),
            ]
        );
        assert_eq!(pairing.dropped(), 0);
    }

    #[test]
    fn test_surplus_times_truncated() {
        // 3 time tokens, 2 ids: exactly 2 records from the first 2 times.
        let fields = scan_text("08:00 09:00 10:00 40167 32231");
        let pairing = pair(&fields, false);

        assert_eq!(pairing.records.len(), 2);
        assert_eq!(pairing.records[0].time, "08:00");
        assert_eq!(pairing.records[1].time, "09:00");
        assert_eq!(pairing.dropped_times, 1);
        assert_eq!(pairing.dropped_ids, 0);
    }

    #[test]
    fn test_surplus_ids_never_appear() {
        let fields = scan_text("08:00 40167 32231 55555");
        let pairing = pair(&fields, false);

        assert_eq!(pairing.records.len(), 1);
        assert!(pairing.records.iter().all(|r| r.fleet_id != "32231"));
        assert!(pairing.records.iter().all(|r| r.fleet_id != "55555"));
        assert_eq!(pairing.dropped_ids, 2);
    }

    #[test]
    fn test_truncation_is_idempotent() {
        let text = "08:00 09:00 10:00 40167 32231";
        let first = pair(&scan_text(text), false);
        let second = pair(&scan_text(text), false);
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        let pairing = pair(&scan_text("nenhum token aqui"), false);
        assert!(pairing.records.is_empty());
        assert_eq!(pairing.dropped(), 0);
    }

    #[test]
    fn test_line_pairing_survives_spurious_id() {
        // A stray digit run on its own line must not shift later rows.
        let lines = vec![
            RecognizedLine::new("06:30 40167"),
            RecognizedLine::new("pedido 99999"),
            RecognizedLine::new("07:45 32231"),
        ];
        let pairing = pair(&scan_lines(&lines), false);

        assert_eq!(pairing.strategy, PairStrategy::LineAware);
        assert_eq!(
            pairing.records,
            vec![
                ScheduleRecord::new("06:30", "40167"),
                ScheduleRecord::new("07:45", "32231"),
            ]
        );
        assert_eq!(pairing.dropped_ids, 1);
        assert_eq!(pairing.dropped_times, 0);
    }

    #[test]
    fn test_line_pairing_drops_unmatched_time() {
        let lines = vec![
            RecognizedLine::new("06:30 40167"),
            RecognizedLine::new("09:00 sem frota"),
        ];
        let pairing = pair(&scan_lines(&lines), false);

        assert_eq!(pairing.records.len(), 1);
        assert_eq!(pairing.dropped_times, 1);
    }

    #[test]
    fn test_force_positional_overrides_layout() {
        let lines = vec![
            RecognizedLine::new("06:30 40167"),
            RecognizedLine::new("ruido 99999"),
            RecognizedLine::new("07:45 32231"),
        ];
        let pairing = pair(&scan_lines(&lines), true);

        assert_eq!(pairing.strategy, PairStrategy::Positional);
        // Positional zipping mispairs here - the documented fragility.
        assert_eq!(
            pairing.records,
            vec![
                ScheduleRecord::new("06:30", "40167"),
                ScheduleRecord::new("07:45", "99999"),
            ]
        );
    }

    #[test]
    fn test_multiple_pairs_on_one_line() {
        let lines = vec![RecognizedLine::new("06:30 40167 07:45 32231")];
        let pairing = pair(&scan_lines(&lines), false);

        assert_eq!(
            pairing.records,
            vec![
                ScheduleRecord::new("06:30", "40167"),
                ScheduleRecord::new("07:45", "32231"),
            ]
        );
    }
}
