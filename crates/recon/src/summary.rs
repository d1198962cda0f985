use serde::Serialize;

use crate::model::{SkippedSheet, SourceOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub threshold: f64,
    pub reference_labels: usize,
}

impl RunMeta {
    pub fn new(config_name: &str, threshold: f64, reference_labels: usize) -> Self {
        Self {
            config_name: config_name.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            threshold,
            reference_labels,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub matched: usize,
    pub unmatched: usize,
    pub dropped: usize,
}

impl Counts {
    fn add(&mut self, other: &Counts) {
        self.matched += other.matched;
        self.unmatched += other.unmatched;
        self.dropped += other.dropped;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub source: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub sheets: Vec<SheetSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_sheets: Vec<SkippedSheet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub meta: RunMeta,
    pub totals: Counts,
    pub sources: Vec<SourceSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_sources: Vec<SkippedSource>,
    /// Graph files written, with their triple counts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub graphs: Vec<GraphSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub path: String,
    pub triples: usize,
    pub entities: usize,
}

/// Summary counts for one source outcome.
pub fn summarize_source(outcome: &SourceOutcome) -> SourceSummary {
    let mut counts = Counts::default();
    let sheets = outcome
        .sheets
        .iter()
        .map(|s| {
            let sheet_counts = Counts {
                matched: s.output.matches.len(),
                unmatched: s.output.unmatched.len(),
                dropped: s.output.dropped,
            };
            counts.add(&sheet_counts);
            SheetSummary {
                sheet: s.sheet.clone(),
                counts: sheet_counts,
            }
        })
        .collect();

    SourceSummary {
        source: outcome.source.clone(),
        counts,
        sheets,
        skipped_sheets: outcome.skipped_sheets.clone(),
    }
}

pub fn compute_summary(
    meta: RunMeta,
    sources: Vec<SourceSummary>,
    skipped_sources: Vec<SkippedSource>,
) -> RunSummary {
    let mut totals = Counts::default();
    for s in &sources {
        totals.add(&s.counts);
    }
    RunSummary {
        meta,
        totals,
        sources,
        skipped_sources,
        graphs: Vec::new(),
    }
}
