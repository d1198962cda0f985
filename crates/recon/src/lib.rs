//! `occgraph-recon` — Historical occupation title reconciliation.
//!
//! Pure engine crate: receives pre-loaded tables, returns classified records.
//! No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod matcher;
pub mod model;
pub mod reference;
pub mod summary;

pub use classify::classify;
pub use config::PipelineConfig;
pub use engine::reconcile_source;
pub use error::ReconError;
pub use identity::{identify, EntityId};
pub use model::{ClassifyOutput, HistoricalRecord, MatchResult, SourceTable};
pub use reference::{CodeCatalog, ReferenceIndex};
