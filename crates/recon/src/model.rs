use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One sheet of one source file, as handed over by the loader.
///
/// `columns` are already unique. Each row has at most `columns.len()` cells;
/// `None` marks a blank or unreadable cell.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub source: String,
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SourceTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the values of one column; blank cells yield `None`.
    pub fn column_values<'a>(&'a self, idx: usize) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(idx).and_then(|c| c.as_deref()))
    }
}

/// One historical row: a typed label plus the open bag of every non-empty
/// cell, kept in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRecord {
    pub source: String,
    pub sheet: String,
    /// Zero-based data row (header excluded). Diagnostics only; never part
    /// of an entity's identity.
    pub row: usize,
    /// Label cell, string-cast and trimmed. Empty when the cell was blank.
    pub label: String,
    pub fields: Vec<(String, String)>,
    /// Canonical reference label attached by the classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl HistoricalRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Copy of this record carrying the matched canonical label.
    pub fn with_annotation(&self, label: &str) -> Self {
        let mut record = self.clone();
        record.annotation = Some(label.to_string());
        record
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub matched_label: String,
    pub score: f64,
    pub record: HistoricalRecord,
}

/// Stable partition of a record sequence.
///
/// Every input record lands in exactly one of `matches`, `unmatched`, or the
/// `dropped` tally (blank / `nan` labels).
#[derive(Debug, Clone, Default)]
pub struct ClassifyOutput {
    pub matches: Vec<MatchResult>,
    pub unmatched: Vec<HistoricalRecord>,
    pub dropped: usize,
}

impl ClassifyOutput {
    pub fn total(&self) -> usize {
        self.matches.len() + self.unmatched.len() + self.dropped
    }

    /// Matched records (annotated) followed by unmatched ones.
    pub fn records(&self) -> impl Iterator<Item = &HistoricalRecord> {
        self.matches
            .iter()
            .map(|m| &m.record)
            .chain(self.unmatched.iter())
    }
}

// ---------------------------------------------------------------------------
// Per-source outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SheetOutcome {
    pub sheet: String,
    /// Header of the source sheet, used to lay out the comparison tables.
    pub columns: Vec<String>,
    pub output: ClassifyOutput,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSheet {
    pub sheet: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SourceOutcome {
    pub source: String,
    pub sheets: Vec<SheetOutcome>,
    pub skipped_sheets: Vec<SkippedSheet>,
}

impl SourceOutcome {
    pub fn records(&self) -> impl Iterator<Item = &HistoricalRecord> {
        self.sheets.iter().flat_map(|s| s.output.records())
    }
}
