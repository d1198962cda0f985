use occgraph_recon::config::NamespaceConfig;
use occgraph_recon::EntityId;

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const SKOS_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
pub const SKOS_NOTATION: &str = "http://www.w3.org/2004/02/skos/core#notation";
pub const SKOS_RELATED: &str = "http://www.w3.org/2004/02/skos/core#related";
pub const SKOS_CLOSE_MATCH: &str = "http://www.w3.org/2004/02/skos/core#closeMatch";

/// Replace every char outside `[A-Za-z0-9_]` with `_`.
pub fn clean_for_uri(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// The run's namespace bindings and IRI minting.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entity: String,
    property: String,
    modern: String,
}

impl Vocabulary {
    pub fn new(ns: &NamespaceConfig) -> Self {
        Self {
            entity: ns.entity.clone(),
            property: ns.property.clone(),
            modern: ns.modern.clone(),
        }
    }

    /// Prefix bindings in serialization order.
    pub fn prefixes(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("glmo", self.entity.as_str()),
            ("glmop", self.property.as_str()),
            ("kldb", self.modern.as_str()),
            ("rdf", RDF),
            ("rdfs", RDFS),
            ("skos", SKOS),
        ]
    }

    pub fn entity_iri(&self, id: &EntityId) -> String {
        format!("{}{}", self.entity, id.local_name())
    }

    pub fn modern_iri(&self, id: &EntityId) -> String {
        format!("{}{}", self.modern, id.local_name())
    }

    /// Generic property keyed by the cleaned column name.
    pub fn property_iri(&self, column: &str) -> String {
        format!("{}{}", self.property, clean_for_uri(column))
    }

    /// Source provenance predicate.
    pub fn source_iri(&self) -> String {
        format!("{}source", self.entity)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(&NamespaceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use occgraph_recon::identity::{identify, MODERN_NS};

    #[test]
    fn clean_replaces_non_alphanumerics() {
        assert_eq!(clean_for_uri(" Anzahl (gesamt) "), "Anzahl__gesamt_");
        assert_eq!(clean_for_uri("berufs_nummer"), "berufs_nummer");
        assert_eq!(clean_for_uri("Größe"), "Gr__e");
        assert_eq!(clean_for_uri("Unnamed: 3"), "Unnamed__3");
    }

    #[test]
    fn iris_use_configured_namespaces() {
        let v = Vocabulary::default();
        assert_eq!(v.property_iri("Jahr"), "http://example.com/glmo/property/Jahr");
        assert_eq!(v.source_iri(), "http://example.com/glmo/source");
        let id = identify("Zerspanungsmechaniker", MODERN_NS);
        assert_eq!(v.modern_iri(&id), format!("http://purl.org/lob/kldb/modern-{}", id.digest()));
    }
}
