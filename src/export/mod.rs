//! Export sinks for paired schedule records.
//!
//! All sinks are all-or-nothing over the full record list: a failure
//! leaves nothing partially written and the in-memory records untouched.

mod clipboard;
mod tsv;
mod xlsx;

pub use clipboard::copy_to_clipboard;
pub use tsv::{to_tsv, write_tsv};
pub use xlsx::{write_xlsx, write_xlsx_to, SheetOptions, SHEET_NAME};

use thiserror::Error;

/// Errors from export sinks.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet export failed: {0}")]
    Spreadsheet(String),

    #[error("clipboard copy failed: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
