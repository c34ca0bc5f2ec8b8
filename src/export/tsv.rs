//! Tab-separated serialization.
//!
//! The same bytes go to the clipboard and to TSV files: one
//! `time<TAB>fleetId` line per record, newline-joined, no header.

use std::path::Path;

use crate::models::ScheduleRecord;

use super::ExportError;

/// Serialize records as tab-separated lines.
pub fn to_tsv(records: &[ScheduleRecord]) -> String {
    records
        .iter()
        .map(|r| format!("{}\t{}", r.time, r.fleet_id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the TSV serialization to a file.
pub fn write_tsv(path: &Path, records: &[ScheduleRecord]) -> Result<(), ExportError> {
    std::fs::write(path, to_tsv(records))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsv_format_is_exact() {
        let records = vec![
            ScheduleRecord::new("13:00:00", "40167"),
            ScheduleRecord::new("15:10:00", "32231"),
        ];
        assert_eq!(to_tsv(&records), "13:00:00\t40167\n15:10:00\t32231");
    }

    #[test]
    fn test_tsv_empty() {
        assert_eq!(to_tsv(&[]), "");
    }

    #[test]
    fn test_write_tsv_round_trips() {
        let records = vec![ScheduleRecord::new("7:05", "4016")];
        let file = tempfile::NamedTempFile::new().unwrap();
        write_tsv(file.path(), &records).unwrap();
        assert_eq!(
            std::fs::read_to_string(file.path()).unwrap(),
            "7:05\t4016"
        );
    }
}
