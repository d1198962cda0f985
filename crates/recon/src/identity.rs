use std::fmt;

use sha2::{Digest, Sha256};

pub const OCCUPATION_NS: &str = "occupation";
pub const CONCEPT_NS: &str = "concept";
pub const MODERN_NS: &str = "modern";

/// Content-derived entity identifier: SHA-256 of `"<namespace>:<text>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    namespace: String,
    digest: String,
}

impl EntityId {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 64 lowercase hex chars.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// IRI-safe local name, e.g. `occupation-3fa4…`.
    pub fn local_name(&self) -> String {
        format!("{}-{}", self.namespace, self.digest)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.digest)
    }
}

pub fn identify(defining_text: &str, namespace: &str) -> EntityId {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(defining_text.as_bytes());
    EntityId {
        namespace: namespace.to_string(),
        digest: format!("{:x}", hasher.finalize()),
    }
}

/// Defining text of an occupation record: the base label, qualified by the
/// specialization when one is present.
pub fn occupation_text(base_label: &str, specialization: Option<&str>) -> String {
    let base = base_label.trim();
    match specialization.map(str::trim).filter(|s| !s.is_empty()) {
        Some(spec) => format!("{base} ({spec})"),
        None => base.to_string(),
    }
}
