use std::collections::{BTreeSet, HashSet};

/// Object position of a triple. Cell values are always plain string
/// literals; relation edges point at IRIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

/// Ordered, de-duplicated triple set with its prefix bindings.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    prefixes: Vec<(String, String)>,
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `namespace`. Rebinding a prefix replaces it.
    pub fn bind(&mut self, prefix: &str, namespace: &str) {
        if let Some(entry) = self.prefixes.iter_mut().find(|(p, _)| p == prefix) {
            entry.1 = namespace.to_string();
        } else {
            self.prefixes.push((prefix.to_string(), namespace.to_string()));
        }
    }

    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    /// Returns false when the triple was already present.
    pub fn add(&mut self, subject: &str, predicate: &str, object: Term) -> bool {
        self.triples.insert(Triple {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object,
        })
    }

    pub fn add_literal(&mut self, subject: &str, predicate: &str, value: &str) -> bool {
        self.add(subject, predicate, Term::Literal(value.to_string()))
    }

    pub fn add_iri(&mut self, subject: &str, predicate: &str, object: &str) -> bool {
        self.add(subject, predicate, Term::Iri(object.to_string()))
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Triples about `subject`, in predicate/object order.
    pub fn about<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| t.subject == subject)
    }

    pub fn subject_count(&self) -> usize {
        self.triples
            .iter()
            .map(|t| t.subject.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
