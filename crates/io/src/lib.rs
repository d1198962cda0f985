// Tabular I/O: source workbooks, reference and mapping tables, comparison output

pub mod csv;
pub mod discover;
pub mod xlsx;

use std::path::Path;

use occgraph_recon::SourceTable;

/// Load every table of a file, dispatching on its extension.
///
/// `.csv` yields one table named after the file stem; everything else goes
/// through the workbook reader.
pub fn load_tables(path: &Path) -> Result<Vec<SourceTable>, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") | Some("tsv") | Some("txt") => Ok(vec![csv::read_table(path)?]),
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
            xlsx::read_workbook(path)
        }
        Some(other) => Err(format!("Unsupported table format: .{}", other)),
        None => Err(format!("Cannot infer table format of {}", path.display())),
    }
}

/// File name used as the `source` of loaded tables.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Make a header row unique: blanks become `Unnamed: <idx>`, repeats of `X`
/// become `X_1`, `X_2`, …
pub fn make_unique(headers: &[Option<String>]) -> Vec<String> {
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut out = Vec::with_capacity(headers.len());
    for (idx, h) in headers.iter().enumerate() {
        let base = match h.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => format!("Unnamed: {}", idx),
        };
        let mut name = base.clone();
        while seen.contains(&name) {
            let n = counts.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{}_{}", base, n);
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(items: &[&str]) -> Vec<Option<String>> {
        items
            .iter()
            .map(|s| if s.is_empty() { None } else { Some(s.to_string()) })
            .collect()
    }

    #[test]
    fn unique_headers() {
        assert_eq!(
            make_unique(&h(&["Berufs", "Jahr", "Berufs", "", "Berufs"])),
            vec!["Berufs", "Jahr", "Berufs_1", "Unnamed: 3", "Berufs_2"]
        );
    }

    #[test]
    fn unique_headers_skip_taken_suffix() {
        assert_eq!(
            make_unique(&h(&["X", "X_1", "X"])),
            vec!["X", "X_1", "X_2"]
        );
    }

    #[test]
    fn unsupported_extension() {
        let err = load_tables(Path::new("notes.pdf")).unwrap_err();
        assert!(err.contains(".pdf"));
    }
}
