//! System clipboard export.

use arboard::Clipboard;

use crate::models::ScheduleRecord;

use super::{to_tsv, ExportError};

/// Copy records to the system clipboard in TSV form.
///
/// Fails on headless systems with no clipboard; the records themselves
/// are never touched.
pub fn copy_to_clipboard(records: &[ScheduleRecord]) -> Result<(), ExportError> {
    let text = to_tsv(records);
    let mut clipboard = Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ExportError::Clipboard(e.to_string()))
}
