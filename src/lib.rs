//! frotascan - fleet schedule extraction from scheduling screenshots.
//!
//! Converts screenshots of fleet scheduling boards into structured
//! `{time, fleet id}` records: validate the image, OCR it, scan the
//! recognized text for time-of-day and fleet-identifier tokens, pair
//! them into rows, and export the rows as clipboard text, TSV, JSON,
//! or an XLSX spreadsheet.

pub mod cli;
pub mod config;
pub mod export;
pub mod extract;
pub mod loader;
pub mod models;
pub mod ocr;
pub mod pair;
pub mod pipeline;
