use log::{debug, info, warn};

use crate::classify::classify_with;
use crate::config::ColumnBindings;
use crate::error::ReconError;
use crate::matcher::FuzzyMatcher;
use crate::model::{HistoricalRecord, SheetOutcome, SkippedSheet, SourceOutcome, SourceTable};

/// Turn one sheet into records. Blank cells are left out of the property bag;
/// a missing label column is a sheet-level error the caller may skip.
pub fn records_from_table(
    table: &SourceTable,
    columns: &ColumnBindings,
) -> Result<Vec<HistoricalRecord>, ReconError> {
    let label_idx = table
        .column_index(&columns.label)
        .ok_or_else(|| ReconError::MissingLabelColumn {
            source: table.source.clone(),
            sheet: table.sheet.clone(),
            column: columns.label.clone(),
        })?;

    let annotation_idx = table.column_index(&columns.match_annotation);

    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let label = row
                .get(label_idx)
                .and_then(|c| c.as_deref())
                .map(|s| s.trim().to_string())
                .unwrap_or_default();

            let fields = table
                .columns
                .iter()
                .zip(row.iter())
                .filter_map(|(col, cell)| {
                    let value = cell.as_deref()?.trim();
                    (!value.is_empty()).then(|| (col.clone(), value.to_string()))
                })
                .collect();

            // Re-read comparison workbooks keep their annotation column.
            let annotation = annotation_idx
                .and_then(|i| row.get(i))
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);

            HistoricalRecord {
                source: table.source.clone(),
                sheet: table.sheet.clone(),
                row: row_idx,
                label,
                fields,
                annotation,
            }
        })
        .collect();

    Ok(records)
}

/// Classify every sheet of one source file. Sheets without the label column
/// are recorded as skipped, never fatal.
pub fn reconcile_source(
    source: &str,
    tables: &[SourceTable],
    matcher: &FuzzyMatcher,
    columns: &ColumnBindings,
    threshold: f64,
) -> SourceOutcome {
    let mut outcome = SourceOutcome {
        source: source.to_string(),
        ..Default::default()
    };

    for table in tables {
        let records = match records_from_table(table, columns) {
            Ok(records) => records,
            Err(e) => {
                warn!("{e}; sheet skipped");
                outcome.skipped_sheets.push(SkippedSheet {
                    sheet: table.sheet.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let output = classify_with(records, matcher, threshold);
        debug!(
            "{source} [{}]: {} matched, {} unmatched, {} dropped",
            table.sheet,
            output.matches.len(),
            output.unmatched.len(),
            output.dropped
        );

        outcome.sheets.push(SheetOutcome {
            sheet: table.sheet.clone(),
            columns: table.columns.clone(),
            output,
        });
    }

    let (matched, unmatched) = outcome.sheets.iter().fold((0, 0), |(m, u), s| {
        (m + s.output.matches.len(), u + s.output.unmatched.len())
    });
    info!("{source}: {matched} matched, {unmatched} unmatched");

    outcome
}
