//! XLSX spreadsheet export.
//!
//! Writes a minimal single-sheet workbook: two labeled columns with
//! fixed widths, one row per record, all cells as inline strings. The
//! container is plain zip + SpreadsheetML, which any spreadsheet
//! application (and our own round-trip tests) can read back.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::models::ScheduleRecord;

use super::ExportError;

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Agendamentos";

/// Column titles and widths for the exported sheet.
#[derive(Debug, Clone)]
pub struct SheetOptions {
    pub time_column: String,
    pub fleet_column: String,
    pub time_width: f64,
    pub fleet_width: f64,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            time_column: "Horário".to_string(),
            fleet_column: "Frota".to_string(),
            time_width: 12.0,
            fleet_width: 10.0,
        }
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Write records to an XLSX file at `path`.
pub fn write_xlsx(
    path: &Path,
    records: &[ScheduleRecord],
    options: &SheetOptions,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_xlsx_to(file, records, options)
}

/// Write records as an XLSX workbook to any seekable writer.
pub fn write_xlsx_to<W: Write + Seek>(
    writer: W,
    records: &[ScheduleRecord],
    options: &SheetOptions,
) -> Result<(), ExportError> {
    let mut zip = ZipWriter::new(writer);
    let file_options = SimpleFileOptions::default();

    let entries = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(records, options)),
    ];

    for (name, content) in entries {
        zip.start_file(name, file_options)
            .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()
        .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;
    Ok(())
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(SHEET_NAME)
    )
}

fn sheet_xml(records: &[ScheduleRecord], options: &SheetOptions) -> String {
    let mut xml = String::with_capacity(512 + records.len() * 128);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    xml.push_str(&format!(
        r#"<cols><col min="1" max="1" width="{}" customWidth="1"/><col min="2" max="2" width="{}" customWidth="1"/></cols>"#,
        options.time_width, options.fleet_width
    ));
    xml.push_str("<sheetData>");

    push_row(&mut xml, 1, &options.time_column, &options.fleet_column);
    for (index, record) in records.iter().enumerate() {
        push_row(&mut xml, index + 2, &record.time, &record.fleet_id);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_row(xml: &mut String, row: usize, first: &str, second: &str) {
    xml.push_str(&format!(
        r#"<row r="{row}"><c r="A{row}" t="inlineStr"><is><t>{}</t></is></c><c r="B{row}" t="inlineStr"><is><t>{}</t></is></c></row>"#,
        escape(first),
        escape(second),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sheet_xml_rows() {
        let records = vec![
            ScheduleRecord::new("13:00:00", "40167"),
            ScheduleRecord::new("15:10:00", "32231"),
        ];
        let xml = sheet_xml(&records, &SheetOptions::default());

        assert!(xml.contains("<t>Horário</t>"));
        assert!(xml.contains("<t>Frota</t>"));
        assert!(xml.contains(r#"<row r="2"><c r="A2" t="inlineStr"><is><t>13:00:00</t>"#));
        assert!(xml.contains("<t>32231</t>"));
    }

    #[test]
    fn test_sheet_xml_escapes_titles() {
        let options = SheetOptions {
            time_column: "Saída & Chegada".to_string(),
            ..SheetOptions::default()
        };
        let xml = sheet_xml(&[], &options);
        assert!(xml.contains("Saída &amp; Chegada"));
    }

    #[test]
    fn test_workbook_is_a_zip() {
        let mut buffer = Cursor::new(Vec::new());
        write_xlsx_to(
            &mut buffer,
            &[ScheduleRecord::new("7:05", "4016")],
            &SheetOptions::default(),
        )
        .unwrap();

        let bytes = buffer.into_inner();
        // Zip local file header magic.
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("xl/worksheets/sheet1.xml").is_ok());
        assert!(archive.by_name("xl/workbook.xml").is_ok());
    }
}
