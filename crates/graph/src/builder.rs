use std::collections::HashSet;

use log::debug;

use occgraph_recon::config::{ColumnBindings, DuplicatePolicy, GraphConfig};
use occgraph_recon::identity::{identify, occupation_text, CONCEPT_NS, MODERN_NS, OCCUPATION_NS};
use occgraph_recon::{CodeCatalog, HistoricalRecord};

use crate::mapping::EquivalenceTable;
use crate::term::Graph;
use crate::vocab::{
    Vocabulary, RDFS_LABEL, RDF_TYPE, SKOS_CLOSE_MATCH, SKOS_CONCEPT, SKOS_NOTATION, SKOS_RELATED,
};

/// Accumulates classified records into one graph partition.
///
/// The seen-set lives as long as the builder, so feeding several source
/// files through one builder collapses identical entities across them.
pub struct GraphBuilder<'a> {
    vocab: Vocabulary,
    columns: &'a ColumnBindings,
    duplicates: DuplicatePolicy,
    mapping: Option<&'a EquivalenceTable>,
    catalog: Option<&'a CodeCatalog>,
    graph: Graph,
    seen: HashSet<String>,
    entities: usize,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &GraphConfig, columns: &'a ColumnBindings) -> Self {
        let vocab = Vocabulary::new(&config.namespaces);
        let mut graph = Graph::new();
        for (prefix, ns) in vocab.prefixes() {
            graph.bind(prefix, ns);
        }
        Self {
            vocab,
            columns,
            duplicates: config.duplicates,
            mapping: None,
            catalog: None,
            graph,
            seen: HashSet::new(),
            entities: 0,
        }
    }

    pub fn with_mapping(mut self, mapping: &'a EquivalenceTable) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn with_catalog(mut self, catalog: &'a CodeCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Text the record's identity is derived from under the active policy.
    pub fn defining_text(&self, record: &HistoricalRecord) -> String {
        let specialization = self
            .columns
            .specialization
            .as_deref()
            .and_then(|col| record.get(col));
        let base = occupation_text(&record.label, specialization);
        match self.duplicates {
            DuplicatePolicy::Merge => base,
            DuplicatePolicy::KeepDistinct => {
                let mut extra: Vec<(&str, &str)> = record
                    .fields
                    .iter()
                    .filter(|(c, _)| !self.is_identity_column(c))
                    .map(|(c, v)| (c.as_str(), v.as_str()))
                    .collect();
                extra.sort();
                if extra.is_empty() {
                    return base;
                }
                let tail: Vec<String> = extra.iter().map(|(c, v)| format!("{c}={v}")).collect();
                format!("{base} [{}]", tail.join("; "))
            }
        }
    }

    /// Columns already part of the base defining text, or derived by the
    /// classifier. The notation column is auxiliary and stays out.
    fn is_identity_column(&self, column: &str) -> bool {
        column == self.columns.label
            || column == self.columns.match_annotation
            || self.columns.specialization.as_deref() == Some(column)
    }

    /// Emit one record. Returns false when its entity was already emitted.
    pub fn add_record(&mut self, record: &HistoricalRecord) -> bool {
        if record.label.trim().is_empty() {
            return false;
        }
        let text = self.defining_text(record);
        if !self.seen.insert(text.clone()) {
            debug!("{} row {}: '{}' already in graph", record.source, record.row, text);
            return false;
        }

        let subject = self.vocab.entity_iri(&identify(&text, OCCUPATION_NS));
        self.graph.add_iri(&subject, RDF_TYPE, SKOS_CONCEPT);
        self.graph.add_literal(&subject, RDFS_LABEL, record.label.trim());
        self.graph
            .add_literal(&subject, &self.vocab.source_iri(), &record.source);

        if let Some(notation) = self.columns.notation.as_deref().and_then(|c| record.get(c)) {
            self.graph.add_literal(&subject, SKOS_NOTATION, notation);
        }

        for (column, value) in &record.fields {
            if self.columns.is_reserved(column) {
                continue;
            }
            let predicate = self.vocab.property_iri(column);
            self.graph.add_literal(&subject, &predicate, value);
        }

        if let Some(canonical) = record.annotation.as_deref() {
            let concept = self.concept_node(canonical);
            self.graph.add_iri(&subject, SKOS_CLOSE_MATCH, &concept);
        }

        if let Some(equivalent) = self
            .mapping
            .and_then(|m| m.first_equivalent(record.label.trim()))
        {
            let modern = self.vocab.modern_iri(&identify(equivalent, MODERN_NS));
            self.graph.add_iri(&modern, RDF_TYPE, SKOS_CONCEPT);
            self.graph.add_literal(&modern, RDFS_LABEL, equivalent);
            self.graph.add_iri(&subject, SKOS_RELATED, &modern);
        }

        self.entities += 1;
        true
    }

    fn concept_node(&mut self, canonical: &str) -> String {
        let iri = self.vocab.entity_iri(&identify(canonical, CONCEPT_NS));
        self.graph.add_iri(&iri, RDF_TYPE, SKOS_CONCEPT);
        self.graph.add_literal(&iri, RDFS_LABEL, canonical);
        if let Some(code) = self.catalog.and_then(|c| c.code_for(canonical)) {
            self.graph.add_literal(&iri, SKOS_NOTATION, code);
        }
        iri
    }

    /// Returns the number of new entities.
    pub fn add_records<'r, I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = &'r HistoricalRecord>,
    {
        records
            .into_iter()
            .filter(|r| self.add_record(r))
            .count()
    }

    /// Occupation entities emitted so far.
    pub fn entity_count(&self) -> usize {
        self.entities
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn finish(self) -> Graph {
        self.graph
    }
}

/// Build one partition's graph from classified records.
pub fn build_graph<'r, I>(
    records: I,
    config: &GraphConfig,
    columns: &ColumnBindings,
    mapping: Option<&EquivalenceTable>,
    catalog: Option<&CodeCatalog>,
) -> Graph
where
    I: IntoIterator<Item = &'r HistoricalRecord>,
{
    let mut builder = GraphBuilder::new(config, columns);
    if let Some(m) = mapping {
        builder = builder.with_mapping(m);
    }
    if let Some(c) = catalog {
        builder = builder.with_catalog(c);
    }
    builder.add_records(records);
    builder.finish()
}
