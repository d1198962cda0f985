//! Loader → mapper → graph builder, composed over one validated config.

use std::path::{Path, PathBuf};

use log::{info, warn};

use occgraph_graph::{serialize, EquivalenceTable, GraphBuilder};
use occgraph_io::{discover, load_tables, source_name, xlsx};
use occgraph_recon::config::{GraphFormat, PartitionMode, PipelineConfig};
use occgraph_recon::engine::records_from_table;
use occgraph_recon::matcher::FuzzyMatcher;
use occgraph_recon::model::SourceOutcome;
use occgraph_recon::summary::{GraphSummary, SkippedSource};
use occgraph_recon::{reconcile_source, CodeCatalog, HistoricalRecord, ReferenceIndex};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_USAGE};
use crate::CliError;

/// File name of the single graph written in combined partition mode.
pub const COMBINED_STEM: &str = "occupations";

fn run_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_RUNTIME, message: msg.into(), hint: None }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Read, parse and validate the config, then rebase its paths onto the
/// config file's directory. `threshold` overrides `[matching].threshold`.
pub fn load_config(path: &Path, threshold: Option<f64>) -> Result<PipelineConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| run_err(format!("cannot read config {}: {e}", path.display())))?;
    let mut config = PipelineConfig::from_toml(&text).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: e.to_string(),
        hint: Some(format!("check {}", path.display())),
    })?;

    if let Some(t) = threshold {
        config.matching.threshold = t;
        config.validate().map_err(|e| CliError {
            code: EXIT_USAGE,
            message: e.to_string(),
            hint: Some("--threshold takes a value between 0 and 100".into()),
        })?;
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base_dir);
    Ok(config)
}

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

pub struct Reference {
    pub index: ReferenceIndex,
    pub catalog: Option<CodeCatalog>,
}

/// Build the reference index (and the code catalog when a code column is
/// bound). An unreadable reference file is fatal; an empty index is not.
pub fn load_reference(config: &PipelineConfig) -> Result<Reference, CliError> {
    let path = &config.paths.reference_file;
    let tables = load_tables(path)
        .map_err(|e| run_err(format!("cannot read reference {}: {e}", path.display())))?;

    let label_column = config.columns.reference_label();
    let index = ReferenceIndex::build(&tables, label_column);
    let catalog = config
        .columns
        .reference_code
        .as_deref()
        .map(|code| CodeCatalog::build(&tables, label_column, code));

    info!("reference: {} labels from {}", index.len(), path.display());
    Ok(Reference { index, catalog })
}

pub fn load_mapping(config: &PipelineConfig) -> Result<Option<EquivalenceTable>, CliError> {
    let Some(ref mapping) = config.mapping else {
        return Ok(None);
    };
    let tables = load_tables(&mapping.file)
        .map_err(|e| run_err(format!("cannot read mapping {}: {e}", mapping.file.display())))?;
    let table = EquivalenceTable::build(&tables, &mapping.source_column, &mapping.target_column);
    info!("mapping: {} base labels from {}", table.len(), mapping.file.display());
    Ok(Some(table))
}

// ---------------------------------------------------------------------------
// Mapper stage
// ---------------------------------------------------------------------------

/// Classify every workbook in the input folder and write each source's
/// comparison workbook to `paths.mapper_output`. Unreadable workbooks are
/// reported and skipped.
pub fn map_sources(
    config: &PipelineConfig,
    reference: &Reference,
) -> Result<(Vec<SourceOutcome>, Vec<SkippedSource>), CliError> {
    let paths = &config.paths;
    let workbooks = discover::find_workbooks(&paths.input_folder, Some(&paths.reference_file))
        .map_err(run_err)?;
    if workbooks.is_empty() {
        warn!("no workbooks found in {}", paths.input_folder.display());
    }

    let matcher = FuzzyMatcher::new(&reference.index);
    let threshold = config.matching.threshold;
    let mut outcomes = Vec::new();
    let mut skipped = Vec::new();

    for path in workbooks {
        let source = source_name(&path);
        let tables = match load_tables(&path) {
            Ok(t) => t,
            Err(reason) => {
                warn!("skipping {}: {}", source, reason);
                skipped.push(SkippedSource { source, reason });
                continue;
            }
        };

        let outcome = reconcile_source(&source, &tables, &matcher, &config.columns, threshold);
        let out = xlsx::comparison_path(&paths.mapper_output, &source);
        match xlsx::write_comparison(&out, &outcome, &config.columns.match_annotation)
            .map_err(run_err)?
        {
            Some(report) => info!("wrote {} ({} sheets)", report.path.display(), report.sheets_written),
            None => info!("{}: nothing to write", source),
        }
        outcomes.push(outcome);
    }

    Ok((outcomes, skipped))
}

// ---------------------------------------------------------------------------
// Graph stage
// ---------------------------------------------------------------------------

/// One graph partition: a file stem and the records that feed it.
pub struct Partition<'a> {
    pub stem: String,
    pub records: Vec<&'a HistoricalRecord>,
}

/// Group outcomes per the configured partition mode.
pub fn partitions<'a>(mode: PartitionMode, outcomes: &'a [SourceOutcome]) -> Vec<Partition<'a>> {
    match mode {
        PartitionMode::PerFile => outcomes
            .iter()
            .map(|o| Partition {
                stem: file_stem(&o.source),
                records: o.records().collect(),
            })
            .collect(),
        PartitionMode::Combined => vec![Partition {
            stem: COMBINED_STEM.to_string(),
            records: outcomes.iter().flat_map(|o| o.records()).collect(),
        }],
    }
}

/// Build and serialize one graph per partition into `paths.ontology_output`.
pub fn write_graphs(
    config: &PipelineConfig,
    outcomes: &[SourceOutcome],
    mapping: Option<&EquivalenceTable>,
    catalog: Option<&CodeCatalog>,
) -> Result<Vec<GraphSummary>, CliError> {
    let out_dir = &config.paths.ontology_output;
    std::fs::create_dir_all(out_dir)
        .map_err(|e| run_err(format!("cannot create {}: {e}", out_dir.display())))?;

    let format = config.graph.format;
    let mut written = Vec::new();
    for partition in partitions(config.graph.partition, outcomes) {
        if partition.records.is_empty() {
            continue;
        }
        let mut builder = GraphBuilder::new(&config.graph, &config.columns);
        if let Some(m) = mapping {
            builder = builder.with_mapping(m);
        }
        if let Some(c) = catalog {
            builder = builder.with_catalog(c);
        }
        let entities = builder.add_records(partition.records.iter().copied());
        let graph = builder.finish();

        let path = graph_path(out_dir, &partition.stem, format);
        std::fs::write(&path, serialize(&graph, format))
            .map_err(|e| run_err(format!("cannot write {}: {e}", path.display())))?;
        info!("wrote {} ({} triples)", path.display(), graph.len());

        written.push(GraphSummary {
            path: path.display().to_string(),
            triples: graph.len(),
            entities,
        });
    }
    Ok(written)
}

pub fn graph_path(dir: &Path, stem: &str, format: GraphFormat) -> PathBuf {
    dir.join(format!("{}.{}", stem, format.extension()))
}

fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

/// Re-read comparison workbooks from `paths.mapper_output` as outcomes, so
/// the graph stage can run on its own. Records keep the annotation column
/// written by the mapper stage.
pub fn load_comparisons(config: &PipelineConfig) -> Result<Vec<SourceOutcome>, CliError> {
    let dir = &config.paths.mapper_output;
    let workbooks = discover::find_workbooks(dir, None).map_err(run_err)?;
    let mut outcomes = Vec::new();

    for path in workbooks {
        let name = source_name(&path);
        let Some(source) = source_of_comparison(&name) else {
            continue;
        };
        let tables = match load_tables(&path) {
            Ok(t) => t,
            Err(reason) => {
                warn!("skipping {}: {}", name, reason);
                continue;
            }
        };

        let mut outcome = SourceOutcome { source, ..SourceOutcome::default() };
        for table in &tables {
            match records_from_table(table, &config.columns) {
                Ok(mut records) => {
                    for r in &mut records {
                        r.source = outcome.source.clone();
                    }
                    let mut sheet = occgraph_recon::model::SheetOutcome {
                        sheet: table.sheet.clone(),
                        columns: table.columns.clone(),
                        output: Default::default(),
                    };
                    sheet.output.unmatched = records;
                    outcome.sheets.push(sheet);
                }
                Err(e) => warn!("{e}"),
            }
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// `comparison_<stem>_vs_GDR.xlsx` → `<stem>.xlsx`.
pub fn source_of_comparison(file_name: &str) -> Option<String> {
    let stem = file_name
        .strip_prefix("comparison_")?
        .strip_suffix(".xlsx")?
        .strip_suffix("_vs_GDR")?;
    Some(format!("{stem}.xlsx"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_names_map_back_to_sources() {
        assert_eq!(
            source_of_comparison("comparison_gewerbe_1880_vs_GDR.xlsx").as_deref(),
            Some("gewerbe_1880.xlsx")
        );
        assert_eq!(source_of_comparison("gewerbe_1880.xlsx"), None);
    }

    #[test]
    fn combined_partition_spans_sources() {
        let rec = |source: &str| HistoricalRecord {
            source: source.into(),
            sheet: "S".into(),
            row: 0,
            label: "Dreher".into(),
            fields: vec![],
            annotation: None,
        };
        let outcome = |source: &str| {
            let mut o = SourceOutcome { source: source.into(), ..SourceOutcome::default() };
            let mut sheet = occgraph_recon::model::SheetOutcome {
                sheet: "S".into(),
                columns: vec!["Berufs".into()],
                output: Default::default(),
            };
            sheet.output.unmatched.push(rec(source));
            o.sheets.push(sheet);
            o
        };
        let outcomes = vec![outcome("a.xlsx"), outcome("b.xlsx")];

        let per_file = partitions(PartitionMode::PerFile, &outcomes);
        assert_eq!(per_file.len(), 2);
        assert_eq!(per_file[1].stem, "b");

        let combined = partitions(PartitionMode::Combined, &outcomes);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].stem, COMBINED_STEM);
        assert_eq!(combined[0].records.len(), 2);
    }

    #[test]
    fn graph_path_follows_format() {
        assert_eq!(
            graph_path(Path::new("graph"), "a", GraphFormat::NTriples),
            PathBuf::from("graph/a.nt")
        );
    }
}
