//! Ontology loading (C10).
//!
//! Loads the fixed Jido ontology documents into a freshly opened store, in
//! the order the Glossary specifies. Each document is embedded at compile
//! time so the crate never depends on ontology files being present on disk
//! at runtime.

use oxigraph::io::RdfFormat;
use oxigraph::store::Store;

use crate::error::{Error, Result};

/// The ontology documents, in load order (Glossary).
const DOCUMENTS: &[(&str, &str)] = &[
    ("core", include_str!("../../ontology/core.ttl")),
    ("knowledge", include_str!("../../ontology/knowledge.ttl")),
    ("decision", include_str!("../../ontology/decision.ttl")),
    ("convention", include_str!("../../ontology/convention.ttl")),
    ("error", include_str!("../../ontology/error.ttl")),
    ("session", include_str!("../../ontology/session.ttl")),
    ("agent", include_str!("../../ontology/agent.ttl")),
    ("project", include_str!("../../ontology/project.ttl")),
    ("task", include_str!("../../ontology/task.ttl")),
    ("code", include_str!("../../ontology/code.ttl")),
];

/// Loads every ontology document into `store`, in order, reporting the
/// number of documents loaded. Intended to run exactly once per freshly
/// opened store (tracked by the caller via `StoreEntry::ontology_loaded`).
pub fn load_ontology(store: &Store) -> Result<usize> {
    for (name, turtle) in DOCUMENTS {
        store
            .load_from_reader(RdfFormat::Turtle, turtle.as_bytes())
            .map_err(|e| {
                Error::StoreUnavailable(format!("failed to load ontology document {name}: {e}"))
            })?;
    }
    Ok(DOCUMENTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_documents_into_a_fresh_store() {
        let store = Store::new().expect("in-memory store");
        let loaded = load_ontology(&store).expect("ontology loads");
        assert_eq!(loaded, DOCUMENTS.len());
        assert!(store.len().unwrap_or(0) > 0);
    }

    #[test]
    fn deleted_marker_individual_is_present() {
        let store = Store::new().expect("in-memory store");
        load_ontology(&store).unwrap();
        let ask = format!(
            "ASK {{ <{}> a <{}MemoryItem> }}",
            crate::triple_store::queries::deleted_marker_iri(),
            crate::types::iri::NAMESPACE
        );
        let result = store.query(&ask).expect("ask query runs");
        match result {
            oxigraph::sparql::QueryResults::Boolean(b) => assert!(b),
            _ => panic!("expected boolean result"),
        }
    }
}
