use std::fmt::Write;

use occgraph_recon::config::GraphFormat;

use crate::term::{Graph, Term, Triple};
use crate::vocab::RDF_TYPE;

pub fn serialize(graph: &Graph, format: GraphFormat) -> String {
    match format {
        GraphFormat::Turtle => to_turtle(graph),
        GraphFormat::NTriples => to_ntriples(graph),
    }
}

// ---------------------------------------------------------------------------
// N-Triples
// ---------------------------------------------------------------------------

pub fn to_ntriples(graph: &Graph) -> String {
    let mut out = String::new();
    for t in graph.iter() {
        let _ = writeln!(
            out,
            "<{}> <{}> {} .",
            t.subject,
            t.predicate,
            full_term(&t.object)
        );
    }
    out
}

fn full_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{iri}>"),
        Term::Literal(value) => quote(value),
    }
}

/// Quoted string literal with Turtle/N-Triples escapes.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Turtle
// ---------------------------------------------------------------------------

/// Prefixed Turtle, one block per subject.
pub fn to_turtle(graph: &Graph) -> String {
    let prefixes = graph.prefixes();
    let mut out = String::new();
    for (prefix, ns) in prefixes {
        let _ = writeln!(out, "@prefix {prefix}: <{ns}> .");
    }

    let triples: Vec<&Triple> = graph.iter().collect();
    for block in triples.chunk_by(|a, b| a.subject == b.subject) {
        out.push('\n');
        out.push_str(&compact(&block[0].subject, prefixes));
        out.push('\n');
        let groups: Vec<&[&Triple]> = block.chunk_by(|a, b| a.predicate == b.predicate).collect();
        for (i, group) in groups.iter().enumerate() {
            let predicate = if group[0].predicate == RDF_TYPE {
                "a".to_string()
            } else {
                compact(&group[0].predicate, prefixes)
            };
            let objects: Vec<String> = group
                .iter()
                .map(|t| match &t.object {
                    Term::Iri(iri) => compact(iri, prefixes),
                    Term::Literal(value) => quote(value),
                })
                .collect();
            let end = if i + 1 == groups.len() { " ." } else { " ;" };
            let _ = writeln!(out, "    {} {}{}", predicate, objects.join(", "), end);
        }
    }
    out
}

/// Shorten an IRI with the longest matching prefix, falling back to `<iri>`.
fn compact(iri: &str, prefixes: &[(String, String)]) -> String {
    prefixes
        .iter()
        .filter_map(|(p, ns)| {
            let local = iri.strip_prefix(ns.as_str())?;
            is_local_name(local).then_some((ns.len(), p, local))
        })
        .max_by_key(|(len, _, _)| *len)
        .map(|(_, p, local)| format!("{p}:{local}"))
        .unwrap_or_else(|| format!("<{iri}>"))
}

fn is_local_name(local: &str) -> bool {
    !local.is_empty()
        && !local.ends_with('-')
        && !local.starts_with('-')
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{RDFS_LABEL, SKOS_CONCEPT};

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.bind("glmo", "http://example.com/glmo/");
        g.bind("glmop", "http://example.com/glmo/property/");
        g.bind("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        g.bind("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        g.bind("skos", "http://www.w3.org/2004/02/skos/core#");
        let s = "http://example.com/glmo/occupation-ab12";
        g.add_iri(s, RDF_TYPE, SKOS_CONCEPT);
        g.add_literal(s, RDFS_LABEL, "Dreher \"alt\"");
        g.add_literal(s, "http://example.com/glmo/property/Jahr", "1880");
        g.add_literal(s, "http://example.com/glmo/property/Jahr", "1881");
        g
    }

    #[test]
    fn turtle_groups_and_compacts() {
        let ttl = to_turtle(&sample());
        let expected = "\
@prefix glmo: <http://example.com/glmo/> .
@prefix glmop: <http://example.com/glmo/property/> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .

glmo:occupation-ab12
    glmop:Jahr \"1880\", \"1881\" ;
    a skos:Concept ;
    rdfs:label \"Dreher \\\"alt\\\"\" .
";
        assert_eq!(ttl, expected);
    }

    #[test]
    fn ntriples_one_line_per_triple() {
        let nt = to_ntriples(&sample());
        assert_eq!(nt.lines().count(), 4);
        assert!(nt.contains(
            "<http://example.com/glmo/occupation-ab12> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2004/02/skos/core#Concept> ."
        ));
    }

    #[test]
    fn unprefixable_iri_stays_bracketed() {
        let prefixes = vec![("glmo".to_string(), "http://example.com/glmo/".to_string())];
        assert_eq!(
            compact("http://example.com/glmo/a.b", &prefixes),
            "<http://example.com/glmo/a.b>"
        );
        assert_eq!(compact("http://other.org/x", &prefixes), "<http://other.org/x>");
    }

    #[test]
    fn quote_escapes_controls() {
        assert_eq!(quote("a\\b\nc\t"), "\"a\\\\b\\nc\\t\"");
    }
}
