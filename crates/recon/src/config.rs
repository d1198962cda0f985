use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ReconError;

pub const DEFAULT_THRESHOLD: f64 = 85.0;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub paths: PathsConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub columns: ColumnBindings,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub mapping: Option<MappingConfig>,
}

fn default_name() -> String {
    "occgraph".into()
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Input and output locations. Relative paths are resolved against the
/// directory holding the config file (see [`PipelineConfig::resolve_paths`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Folder scanned for historical `.xlsx` workbooks.
    pub input_folder: PathBuf,
    /// Reference classification table (`.xlsx` or `.csv`).
    pub reference_file: PathBuf,
    /// Folder receiving one comparison workbook per source file.
    #[serde(default = "default_mapper_output")]
    pub mapper_output: PathBuf,
    /// Folder receiving the serialized graphs.
    #[serde(default = "default_ontology_output")]
    pub ontology_output: PathBuf,
}

fn default_mapper_output() -> PathBuf {
    PathBuf::from("comparison")
}

fn default_ontology_output() -> PathBuf {
    PathBuf::from("graph")
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Inclusive acceptance threshold on the 0..=100 token-sort ratio.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Column bindings
// ---------------------------------------------------------------------------

/// Names of the columns that carry reserved meaning. Every other column is
/// treated as a generic property.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnBindings {
    /// Occupation title in the historical tables.
    #[serde(default = "default_label_column")]
    pub label: String,
    /// Title column in the reference table. Defaults to `label`.
    #[serde(default)]
    pub reference_label: Option<String>,
    /// Classification code column in the reference table.
    #[serde(default)]
    pub reference_code: Option<String>,
    /// Historical column emitted as `skos:notation`.
    #[serde(default)]
    pub notation: Option<String>,
    /// Qualifier combined with the label to form the entity's defining text.
    #[serde(default)]
    pub specialization: Option<String>,
    /// Column appended to matched rows, holding the canonical label.
    #[serde(default = "default_match_column")]
    pub match_annotation: String,
}

fn default_label_column() -> String {
    "Berufs".into()
}

fn default_match_column() -> String {
    "GDR_Match".into()
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self {
            label: default_label_column(),
            reference_label: None,
            reference_code: None,
            notation: None,
            specialization: None,
            match_annotation: default_match_column(),
        }
    }
}

impl ColumnBindings {
    pub fn reference_label(&self) -> &str {
        self.reference_label.as_deref().unwrap_or(&self.label)
    }

    /// True when `column` is consumed by a reserved predicate and must not be
    /// emitted again as a generic property.
    pub fn is_reserved(&self, column: &str) -> bool {
        column == self.label
            || column == self.match_annotation
            || self.notation.as_deref() == Some(column)
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    #[serde(default)]
    pub format: GraphFormat,
    #[serde(default)]
    pub partition: PartitionMode,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    #[serde(default)]
    pub namespaces: NamespaceConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphFormat {
    #[default]
    Turtle,
    NTriples,
}

impl GraphFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Turtle => "ttl",
            Self::NTriples => "nt",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionMode {
    /// One graph per source workbook.
    #[default]
    PerFile,
    /// One graph for the whole run; entities collapse across files.
    Combined,
}

/// What happens to rows sharing a defining label but differing elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// First row wins; later rows with the same defining label are skipped.
    #[default]
    Merge,
    /// Auxiliary values join the defining text, so only identical rows merge.
    KeepDistinct,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceConfig {
    #[serde(default = "default_entity_ns")]
    pub entity: String,
    #[serde(default = "default_property_ns")]
    pub property: String,
    #[serde(default = "default_modern_ns")]
    pub modern: String,
}

fn default_entity_ns() -> String {
    "http://example.com/glmo/".into()
}

fn default_property_ns() -> String {
    "http://example.com/glmo/property/".into()
}

fn default_modern_ns() -> String {
    "http://purl.org/lob/kldb/".into()
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            entity: default_entity_ns(),
            property: default_property_ns(),
            modern: default_modern_ns(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping table
// ---------------------------------------------------------------------------

/// Optional table linking historical base labels to modern equivalents.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    pub file: PathBuf,
    pub source_column: String,
    /// Column holding one or more `/`-separated equivalent labels.
    pub target_column: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let t = self.matching.threshold;
        if !t.is_finite() || !(0.0..=100.0).contains(&t) {
            return Err(ReconError::ConfigValidation(format!(
                "threshold must be within 0..=100, got {t}"
            )));
        }

        let required = [
            ("paths.input_folder", &self.paths.input_folder),
            ("paths.reference_file", &self.paths.reference_file),
            ("paths.mapper_output", &self.paths.mapper_output),
            ("paths.ontology_output", &self.paths.ontology_output),
        ];
        for (key, path) in required {
            if path.as_os_str().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        let c = &self.columns;
        if c.label.trim().is_empty() {
            return Err(ReconError::ConfigValidation("columns.label must not be empty".into()));
        }
        if c.match_annotation.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "columns.match_annotation must not be empty".into(),
            ));
        }
        if c.match_annotation == c.label {
            return Err(ReconError::ConfigValidation(
                "columns.match_annotation must differ from columns.label".into(),
            ));
        }

        if let Some(ref mapping) = self.mapping {
            if mapping.file.as_os_str().is_empty() {
                return Err(ReconError::ConfigValidation("mapping.file must not be empty".into()));
            }
            if mapping.source_column.is_empty() || mapping.target_column.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "mapping.source_column and mapping.target_column are required".into(),
                ));
            }
        }

        Ok(())
    }

    /// Rebase every relative path onto `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };
        rebase(&mut self.paths.input_folder);
        rebase(&mut self.paths.reference_file);
        rebase(&mut self.paths.mapper_output);
        rebase(&mut self.paths.ontology_output);
        if let Some(ref mut mapping) = self.mapping {
            rebase(&mut mapping.file);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
