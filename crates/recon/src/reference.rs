use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, warn};

use crate::model::SourceTable;

/// String-cast, trimmed cell value, or `None` for blanks and `nan` markers.
pub fn normalize_cell(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if is_blank_label(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Blank after trimming, or the literal `nan` in any case.
pub fn is_blank_label(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

// ---------------------------------------------------------------------------
// Reference index
// ---------------------------------------------------------------------------

/// De-duplicated set of canonical labels. Iteration is in sorted order,
/// which the matcher relies on for its tie-break.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    labels: BTreeSet<String>,
}

impl ReferenceIndex {
    /// Merge the `label_column` of every table into one label set.
    ///
    /// Tables without the column contribute nothing. If no table has it the
    /// index is empty and every record will classify as unmatched.
    pub fn build(tables: &[SourceTable], label_column: &str) -> Self {
        let mut labels = BTreeSet::new();
        for table in tables {
            let Some(idx) = table.column_index(label_column) else {
                warn!(
                    "{} [{}]: no '{}' column, sheet ignored for the reference index",
                    table.source, table.sheet, label_column
                );
                continue;
            };
            let before = labels.len();
            labels.extend(table.column_values(idx).filter_map(normalize_cell));
            debug!(
                "{} [{}]: {} new reference label(s)",
                table.source,
                table.sheet,
                labels.len() - before
            );
        }
        if labels.is_empty() {
            warn!("reference index is empty: every record will be unmatched");
        }
        Self { labels }
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            labels: labels
                .into_iter()
                .filter_map(|l| normalize_cell(Some(l.as_ref())))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }
}

// ---------------------------------------------------------------------------
// Code catalog
// ---------------------------------------------------------------------------

/// Classification code → historical labels listed under it, in row order.
#[derive(Debug, Clone, Default)]
pub struct CodeCatalog {
    codes: BTreeMap<String, Vec<String>>,
    by_label: HashMap<String, String>,
}

impl CodeCatalog {
    /// Rows with a blank code or label are skipped. Duplicated labels under
    /// one code are kept.
    pub fn build(tables: &[SourceTable], label_column: &str, code_column: &str) -> Self {
        let mut catalog = Self::default();
        for table in tables {
            let (Some(label_idx), Some(code_idx)) =
                (table.column_index(label_column), table.column_index(code_column))
            else {
                warn!(
                    "{} [{}]: needs both '{}' and '{}' columns, sheet ignored for the code catalog",
                    table.source, table.sheet, label_column, code_column
                );
                continue;
            };
            for row in &table.rows {
                let cell = |i: usize| row.get(i).and_then(|c| c.as_deref());
                let (Some(code), Some(label)) =
                    (normalize_cell(cell(code_idx)), normalize_cell(cell(label_idx)))
                else {
                    continue;
                };
                catalog.insert(code, label);
            }
        }
        catalog
    }

    pub fn insert(&mut self, code: String, label: String) {
        self.by_label.entry(label.clone()).or_insert_with(|| code.clone());
        self.codes.entry(code).or_default().push(label);
    }

    /// Code of the first row that listed `label`.
    pub fn code_for(&self, label: &str) -> Option<&str> {
        self.by_label.get(label).map(|s| s.as_str())
    }

    pub fn labels(&self, code: &str) -> &[String] {
        self.codes.get(code).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.codes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
