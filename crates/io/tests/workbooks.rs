//! Workbook round trips through real files on disk.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;

use occgraph_io::{load_tables, xlsx};
use occgraph_recon::config::ColumnBindings;
use occgraph_recon::matcher::FuzzyMatcher;
use occgraph_recon::{reconcile_source, ReferenceIndex};

fn write_source(path: &Path) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet().set_name("Tabelle1").unwrap();
    ws.write_string(0, 0, "Berufs").unwrap();
    ws.write_string(0, 1, "Jahr").unwrap();
    ws.write_string(0, 2, "Jahr").unwrap();
    ws.write_string(1, 0, "Tischlerin").unwrap();
    ws.write_number(1, 1, 1880.0).unwrap();
    ws.write_string(2, 0, "Kutscher").unwrap();
    ws.write_number(2, 2, 1890.5).unwrap();
    ws.write_string(3, 0, "nan").unwrap();

    let ws = wb.add_worksheet().set_name("Ohne").unwrap();
    ws.write_string(0, 0, "Name").unwrap();
    ws.write_string(1, 0, "Dreher").unwrap();
    wb.save(path).unwrap();
}

fn sheet_rows(path: &Path, sheet: &str) -> Vec<Vec<String>> {
    let mut wb = open_workbook_auto(path).unwrap();
    let range = wb.worksheet_range(sheet).unwrap();
    range
        .rows()
        .map(|r| {
            r.iter()
                .map(|c| match c {
                    Data::String(s) => s.clone(),
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

#[test]
fn reads_all_sheets_with_unique_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gewerbe_1880.xlsx");
    write_source(&path);

    let tables = load_tables(&path).unwrap();
    assert_eq!(tables.len(), 2);
    let t = &tables[0];
    assert_eq!(t.source, "gewerbe_1880.xlsx");
    assert_eq!(t.sheet, "Tabelle1");
    assert_eq!(t.columns, vec!["Berufs", "Jahr", "Jahr_1"]);
    assert_eq!(t.rows.len(), 3);
    assert_eq!(t.rows[0][1].as_deref(), Some("1880"));
    assert_eq!(t.rows[1][2].as_deref(), Some("1890.5"));
    assert_eq!(tables[1].columns, vec!["Name"]);
}

#[test]
fn comparison_workbook_has_partition_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gewerbe_1880.xlsx");
    write_source(&path);

    let tables = load_tables(&path).unwrap();
    let index = ReferenceIndex::from_labels(["Tischler", "Elektriker"]);
    let matcher = FuzzyMatcher::new(&index);
    let columns = ColumnBindings::default();
    let outcome = reconcile_source("gewerbe_1880.xlsx", &tables, &matcher, &columns, 85.0);
    assert_eq!(outcome.skipped_sheets.len(), 1);

    let out_dir = dir.path().join("comparison");
    let out = xlsx::comparison_path(&out_dir, &outcome.source);
    let report = xlsx::write_comparison(&out, &outcome, "GDR_Match")
        .unwrap()
        .expect("two partitions to write");
    assert_eq!(report.sheets_written, 2);
    assert_eq!(report.rows_written, 2);
    assert!(out.ends_with("comparison_gewerbe_1880_vs_GDR.xlsx"));

    let matches = sheet_rows(&out, "Tabelle1_matches");
    assert_eq!(matches[0], vec!["Berufs", "Jahr", "Jahr_1", "GDR_Match"]);
    assert_eq!(matches[1], vec!["Tischlerin", "1880", "", "Tischler"]);

    let unmatched = sheet_rows(&out, "Tabelle1_unmatched");
    assert_eq!(unmatched[0], vec!["Berufs", "Jahr", "Jahr_1"]);
    assert_eq!(unmatched[1], vec!["Kutscher", "", "1890.5"]);
    assert_eq!(unmatched.len(), 2);
}

#[test]
fn nothing_to_write_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = occgraph_recon::model::SourceOutcome {
        source: "leer.xlsx".into(),
        ..Default::default()
    };
    let out = xlsx::comparison_path(dir.path(), "leer.xlsx");
    assert!(xlsx::write_comparison(&out, &outcome, "GDR_Match").unwrap().is_none());
    assert!(!out.exists());
}
