//! XLSX export round-trip: write a workbook, read the sheet back.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use frotascan::export::{write_xlsx, SheetOptions};
use frotascan::models::ScheduleRecord;

/// Read every `<t>` text cell of the first worksheet, grouped by row.
fn read_sheet_rows(path: &Path) -> Vec<Vec<String>> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"row" => rows.push(Vec::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"t" {
                    in_text = false;
                }
            }
            Ok(Event::Text(text)) if in_text => {
                if let Some(row) = rows.last_mut() {
                    row.push(text.unescape().unwrap().to_string());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("xml parse error: {}", e),
        }
    }

    rows
}

#[test]
fn round_trip_preserves_rows_in_order() {
    let records = vec![
        ScheduleRecord::new("13:00:00", "40167"),
        ScheduleRecord::new("15:10:00", "32231"),
        ScheduleRecord::new("7:05", "4016"),
    ];

    let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    write_xlsx(file.path(), &records, &SheetOptions::default()).unwrap();

    let rows = read_sheet_rows(file.path());
    assert_eq!(rows.len(), records.len() + 1);
    assert_eq!(rows[0], vec!["Horário", "Frota"]);
    for (row, record) in rows[1..].iter().zip(&records) {
        assert_eq!(row, &vec![record.time.clone(), record.fleet_id.clone()]);
    }
}

#[test]
fn round_trip_unescapes_custom_titles() {
    let options = SheetOptions {
        time_column: "Saída & Chegada".to_string(),
        fleet_column: "Frota <id>".to_string(),
        ..SheetOptions::default()
    };

    let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    write_xlsx(file.path(), &[], &options).unwrap();

    let rows = read_sheet_rows(file.path());
    assert_eq!(rows, vec![vec!["Saída & Chegada", "Frota <id>"]]);
}

#[test]
fn empty_export_writes_header_only() {
    let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    write_xlsx(file.path(), &[], &SheetOptions::default()).unwrap();

    let rows = read_sheet_rows(file.path());
    assert_eq!(rows.len(), 1);
}
