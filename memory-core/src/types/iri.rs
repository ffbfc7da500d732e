//! IRI builders for the Jido ontology (C1).
//!
//! Every identifier the memory core mints for the triple store is built
//! here so the schema namespace never gets hardcoded a second time. See
//! [`crate::triple_store::queries`] for the class/predicate side of the
//! vocabulary.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Namespace every schema and instance IRI in the Jido ontology lives under.
pub const NAMESPACE: &str = "https://jido.ai/ontology#";

/// `memory_iri(id) = ns + "memory_" + id`.
#[must_use]
pub fn memory_iri(id: &str) -> String {
    format!("{NAMESPACE}memory_{id}")
}

/// `session_iri(id) = ns + "session_" + id`.
#[must_use]
pub fn session_iri(id: &str) -> String {
    format!("{NAMESPACE}session_{id}")
}

/// `agent_iri(id) = ns + "agent_" + id`.
#[must_use]
pub fn agent_iri(id: &str) -> String {
    format!("{NAMESPACE}agent_{id}")
}

/// `project_iri(id) = ns + "project_" + id`.
#[must_use]
pub fn project_iri(id: &str) -> String {
    format!("{NAMESPACE}project_{id}")
}

/// `evidence_iri(ref) = ns + "evidence_" + hash(ref)`.
///
/// The hash only needs to be stable within a process lifetime (it is used
/// to deduplicate identical evidence references, not as a content
/// address), so `DefaultHasher` — which uses fixed keys, unlike the
/// randomized `RandomState` used by `HashMap` — is sufficient.
#[must_use]
pub fn evidence_iri(reference: &str) -> String {
    let mut hasher = DefaultHasher::new();
    reference.hash(&mut hasher);
    format!("{NAMESPACE}evidence_{:016x}", hasher.finish())
}

/// Strip a full memory IRI back down to its bare id, if it is one.
#[must_use]
pub fn parse_memory_id(iri: &str) -> Option<&str> {
    iri.strip_prefix(&format!("{NAMESPACE}memory_"))
}

/// Escape a string for safe embedding inside a SPARQL string literal.
///
/// Only `\` and `"` need escaping for a single-quoted-double SPARQL
/// literal; newlines are escaped too so a malformed value can never break
/// a generated query out of its literal.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_iri_is_deterministic() {
        assert_eq!(evidence_iri("foo"), evidence_iri("foo"));
        assert_ne!(evidence_iri("foo"), evidence_iri("bar"));
    }

    #[test]
    fn memory_id_roundtrip() {
        let iri = memory_iri("abc123");
        assert_eq!(parse_memory_id(&iri), Some("abc123"));
        assert_eq!(parse_memory_id("https://example.com/x"), None);
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_literal(r#"say "hi"\n"#), r#"say \"hi\"\\n"#);
    }
}
