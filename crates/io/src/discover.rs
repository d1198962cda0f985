// Source workbook discovery

use std::path::{Path, PathBuf};

use log::warn;

/// Workbooks directly inside `folder`, sorted by path. `exclude` (the
/// reference file) and Excel lock files (`~$…`) are skipped.
pub fn find_workbooks(folder: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, String> {
    if !folder.is_dir() {
        return Err(format!("Input folder not found: {}", folder.display()));
    }
    let escaped = glob::Pattern::escape(&folder.to_string_lossy());
    let pattern = format!("{}/*.xlsx", escaped);
    let excluded = exclude.and_then(|p| p.canonicalize().ok());

    let mut found = Vec::new();
    for entry in glob::glob(&pattern).map_err(|e| format!("Bad pattern '{}': {}", pattern, e))? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if name.starts_with("~$") {
            continue;
        }
        if excluded.is_some() && path.canonicalize().ok() == excluded {
            continue;
        }
        found.push(path);
    }
    found.sort();
    Ok(found)
}
