use std::collections::HashMap;

use log::warn;

use occgraph_recon::reference::normalize_cell;
use occgraph_recon::SourceTable;

/// Historical base label → modern equivalent labels.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceTable {
    map: HashMap<String, Vec<String>>,
}

/// Split a `/`-delimited cell into trimmed, non-empty labels.
pub fn split_equivalents(cell: &str) -> Vec<String> {
    cell.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl EquivalenceTable {
    /// Rows with a blank base label or no equivalents are skipped. When a base
    /// label repeats, the first row wins.
    pub fn build(tables: &[SourceTable], source_column: &str, target_column: &str) -> Self {
        let mut table = Self::default();
        for t in tables {
            let (Some(src), Some(dst)) = (t.column_index(source_column), t.column_index(target_column))
            else {
                warn!(
                    "{} [{}]: mapping table needs '{}' and '{}' columns, sheet ignored",
                    t.source, t.sheet, source_column, target_column
                );
                continue;
            };
            for row in &t.rows {
                let cell = |i: usize| row.get(i).and_then(|c| c.as_deref());
                let Some(base) = normalize_cell(cell(src)) else {
                    continue;
                };
                let targets = cell(dst).map(split_equivalents).unwrap_or_default();
                if targets.is_empty() {
                    continue;
                }
                table.map.entry(base).or_insert(targets);
            }
        }
        table
    }

    pub fn insert(&mut self, base: &str, targets: &str) {
        let targets = split_equivalents(targets);
        if !targets.is_empty() {
            self.map.entry(base.trim().to_string()).or_insert(targets);
        }
    }

    pub fn equivalents(&self, base: &str) -> &[String] {
        self.map.get(base).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn first_equivalent(&self, base: &str) -> Option<&str> {
        self.equivalents(base).first().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
