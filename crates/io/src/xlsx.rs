// Excel import (all sheets) and comparison workbook export

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::NaiveDateTime;
use log::{debug, warn};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

use occgraph_recon::{HistoricalRecord, SourceTable};
use occgraph_recon::model::SourceOutcome;

use crate::{make_unique, source_name};

/// Excel's sheet name limit.
pub const MAX_SHEET_NAME: usize = 31;

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read every sheet of a workbook. The first row of each sheet is its header.
///
/// A sheet that cannot be read is logged and left out; the other sheets of
/// the workbook still load.
pub fn read_workbook(path: &Path) -> Result<Vec<SourceTable>, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("Excel file contains no sheets".to_string());
    }

    let ranges = sheet_names
        .into_iter()
        .map(|name| {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| format!("Failed to read sheet '{}': {}", name, e));
            (name, range)
        })
        .collect();

    Ok(tables_from_ranges(&source_name(path), ranges))
}

/// Turn per-sheet ranges into tables, skipping the sheets that failed.
///
/// Blank rows inside the range are kept so their records count as dropped
/// during classification, the way the row count of the sheet suggests.
pub fn tables_from_ranges(
    source: &str,
    ranges: Vec<(String, Result<Range<Data>, String>)>,
) -> Vec<SourceTable> {
    let mut tables = Vec::with_capacity(ranges.len());

    for (sheet_name, range) in ranges {
        let range = match range {
            Ok(r) => r,
            Err(reason) => {
                warn!("{} [{}]: {}; sheet skipped", source, sheet_name, reason);
                continue;
            }
        };

        let mut rows = range.rows();
        let columns = match rows.next() {
            Some(header) => make_unique(&header.iter().map(cell_to_string).collect::<Vec<_>>()),
            None => Vec::new(),
        };
        let data: Vec<Vec<Option<String>>> = rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        debug!("{} [{}]: {} columns, {} rows", source, sheet_name, columns.len(), data.len());
        tables.push(SourceTable {
            source: source.to_string(),
            sheet: sheet_name,
            columns,
            rows: data,
        });
    }

    tables
}

/// String-cast one cell. Empty cells and empty strings are `None`.
pub fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(format!("{}", n))
            }
        }
        Data::Int(n) => Some(format!("{}", n)),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(value) => format_datetime(&value),
            None => format!("{}", dt.as_f64()),
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// `YYYY-MM-DD HH:MM:SS`, the text form the source tables are compared in.
fn format_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Comparison workbook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ComparisonReport {
    pub path: PathBuf,
    pub sheets_written: usize,
    pub rows_written: usize,
}

/// `comparison_<stem>_vs_GDR.xlsx` inside `dir`.
pub fn comparison_path(dir: &Path, source: &str) -> PathBuf {
    let stem = Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());
    dir.join(format!("comparison_{}_vs_GDR.xlsx", stem))
}

/// Truncate a sheet name to Excel's limit, on a char boundary.
pub fn sheet_name(sheet: &str, suffix: &str) -> String {
    format!("{}{}", sheet, suffix).chars().take(MAX_SHEET_NAME).collect()
}

/// Write `<sheet>_matches` and `<sheet>_unmatched` for every sheet of one
/// source. Empty partitions are not written; with nothing to write at all,
/// no file is created and `Ok(None)` is returned.
pub fn write_comparison(
    path: &Path,
    outcome: &SourceOutcome,
    annotation_column: &str,
) -> Result<Option<ComparisonReport>, String> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let mut report = ComparisonReport {
        path: path.to_path_buf(),
        ..ComparisonReport::default()
    };
    let mut used_names: Vec<String> = Vec::new();

    for sheet in &outcome.sheets {
        let base_columns: Vec<&str> = sheet
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| *c != annotation_column)
            .collect();

        if !sheet.output.matches.is_empty() {
            let mut columns = base_columns.clone();
            columns.push(annotation_column);
            let name = unique_sheet_name(&sheet.sheet, "_matches", &mut used_names);
            let worksheet = xlsx_workbook
                .add_worksheet()
                .set_name(&name)
                .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;
            let records = sheet.output.matches.iter().map(|m| &m.record);
            report.rows_written += write_records(worksheet, &columns, annotation_column, records)?;
            report.sheets_written += 1;
        }

        if !sheet.output.unmatched.is_empty() {
            let name = unique_sheet_name(&sheet.sheet, "_unmatched", &mut used_names);
            let worksheet = xlsx_workbook
                .add_worksheet()
                .set_name(&name)
                .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;
            let records = sheet.output.unmatched.iter();
            report.rows_written +=
                write_records(worksheet, &base_columns, annotation_column, records)?;
            report.sheets_written += 1;
        }
    }

    if report.sheets_written == 0 {
        return Ok(None);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
    }
    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    Ok(Some(report))
}

/// Truncated names of long sibling sheets can collide; number the repeats.
fn unique_sheet_name(sheet: &str, suffix: &str, used: &mut Vec<String>) -> String {
    let mut name = sheet_name(sheet, suffix);
    let mut n = 1;
    while used.iter().any(|u| u.eq_ignore_ascii_case(&name)) {
        let tag = format!("~{}", n);
        let keep = MAX_SHEET_NAME - tag.len();
        name = format!("{}{}", sheet_name(sheet, suffix).chars().take(keep).collect::<String>(), tag);
        n += 1;
    }
    used.push(name.clone());
    name
}

fn write_records<'a, I>(
    worksheet: &mut Worksheet,
    columns: &[&str],
    annotation_column: &str,
    records: I,
) -> Result<usize, String>
where
    I: Iterator<Item = &'a HistoricalRecord>,
{
    let header = Format::new().set_bold();
    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &header)
            .map_err(|e| format!("Failed to write header '{}': {}", name, e))?;
    }

    let mut written = 0;
    for (i, record) in records.enumerate() {
        let row = (i + 1) as u32;
        for (col, name) in columns.iter().enumerate() {
            let value = if *name == annotation_column {
                record.annotation.as_deref()
            } else {
                record.get(name)
            };
            if let Some(v) = value {
                worksheet
                    .write_string(row, col as u16, v)
                    .map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;
            }
        }
        written += 1;
    }
    Ok(written)
}
