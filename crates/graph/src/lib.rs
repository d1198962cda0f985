//! `occgraph-graph` — Builds the occupation knowledge graph.
//!
//! Classified records in, an ordered triple set out. Entity identities come
//! from content, never from row position, so repeated runs over the same
//! input serialize byte-identically.

pub mod builder;
pub mod mapping;
pub mod serialize;
pub mod term;
pub mod vocab;

pub use builder::{build_graph, GraphBuilder};
pub use mapping::EquivalenceTable;
pub use serialize::{serialize, to_ntriples, to_turtle};
pub use term::{Graph, Term, Triple};
pub use vocab::Vocabulary;
