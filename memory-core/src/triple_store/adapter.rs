//! Maps memory records to/from SPARQL INSERT/DELETE/SELECT (C9).
//!
//! Every operation here is session-scoped: query results whose `assertedIn`
//! doesn't match the caller's `session_id` are never returned, and mutating
//! a memory asserted in another session fails with
//! [`crate::error::Error::SessionMismatch`].

use chrono::{DateTime, Utc};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use oxigraph::model::Term;

use crate::error::{Error, Result};
use crate::types::iri::{agent_iri, escape_literal, evidence_iri, memory_iri, project_iri, session_iri, NAMESPACE};
use crate::types::{ConfidenceLevel, MemoryKind, SourceKind};

use super::queries::{
    class_iri, confidence_level_from_iri, confidence_level_iri, deleted_marker_iri,
    kind_from_class_iri, predicate_iri, source_kind_from_iri, source_kind_iri, Relationship,
    PRED_ACCESS_COUNT, PRED_APPLIES_TO_PROJECT, PRED_ASSERTED_BY, PRED_ASSERTED_IN,
    PRED_DERIVED_FROM, PRED_HAS_CONFIDENCE, PRED_HAS_SOURCE_TYPE, PRED_HAS_TIMESTAMP,
    PRED_LAST_ACCESSED, PRED_RATIONALE, PRED_SUMMARY, PRED_SUPERSEDED_AT, PRED_SUPERSEDED_BY,
    RDF_TYPE,
};

/// A fully materialized long-term memory record.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMemory {
    pub id: String,
    pub content: String,
    pub memory_type: MemoryKind,
    pub confidence: ConfidenceLevel,
    pub source_type: SourceKind,
    pub session_id: String,
    pub agent_id: Option<String>,
    pub project_id: Option<String>,
    pub rationale: Option<String>,
    pub evidence_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub superseded_by: Option<String>,
    pub superseded_at: Option<DateTime<Utc>>,
    pub access_count: u64,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Input to [`TripleStoreAdapter::persist`].
#[derive(Debug, Clone)]
pub struct MemoryInput {
    pub content: String,
    pub memory_type: MemoryKind,
    pub confidence: f64,
    pub source_type: SourceKind,
    pub session_id: String,
    pub agent_id: Option<String>,
    pub project_id: Option<String>,
    pub rationale: Option<String>,
    pub evidence_refs: Vec<String>,
}

/// Filters accepted by the query operations.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub min_confidence: Option<f64>,
    pub include_superseded: bool,
    pub limit: Option<usize>,
    pub memory_type: Option<MemoryKind>,
    /// Substring matched against `summary` via SPARQL `CONTAINS` (kept in
    /// the store, never filtered client-side — see DESIGN.md Open
    /// Question resolution).
    pub query: Option<String>,
}

/// Aggregate triple-store statistics for a session (`get_stats`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterStats {
    pub triple_count: u64,
    pub distinct_subjects: u64,
    pub distinct_predicates: u64,
    pub distinct_objects: u64,
}

fn now_literal(ts: DateTime<Utc>) -> String {
    format!("\"{}\"^^<http://www.w3.org/2001/XMLSchema#dateTime>", ts.to_rfc3339())
}

fn int_literal(n: u64) -> String {
    format!("\"{n}\"^^<http://www.w3.org/2001/XMLSchema#integer>")
}

fn str_literal(s: &str) -> String {
    format!("\"{}\"", escape_literal(s))
}

fn iri_ref(iri: &str) -> String {
    format!("<{iri}>")
}

fn term_to_string(term: &Term) -> String {
    match term {
        Term::NamedNode(n) => n.as_str().to_string(),
        Term::Literal(l) => l.value().to_string(),
        Term::BlankNode(b) => b.as_str().to_string(),
        #[allow(unreachable_patterns)]
        _ => String::new(),
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Records one `memory.adapter.*` telemetry event (spec §6): a duration
/// histogram sample plus a counter bump, and on failure an
/// `ADAPTER_ERROR` bump alongside it.
fn record_adapter_call(event: &'static str, started: std::time::Instant, ok: bool) {
    let telemetry = crate::telemetry::telemetry();
    telemetry.incr(event);
    telemetry.record(crate::telemetry::events::ADAPTER_DURATION_US, started.elapsed().as_micros() as f64);
    if !ok {
        telemetry.incr(crate::telemetry::events::ADAPTER_ERROR);
    }
}

/// Session-scoped SPARQL mapping between [`StoredMemory`] and the Jido
/// ontology. Stateless: every method takes the store handle and
/// `session_id` it operates against.
#[derive(Debug, Default, Clone, Copy)]
pub struct TripleStoreAdapter;

impl TripleStoreAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn validate_input(input: &MemoryInput) -> Result<()> {
        if input.session_id.trim().is_empty() {
            return Err(Error::InvalidInput("session_id must not be empty".into()));
        }
        if input.content.trim().is_empty() {
            return Err(Error::InvalidInput("content must not be empty".into()));
        }
        Ok(())
    }

    /// Insert a new long-term memory record, returning its 32-hex-char id.
    pub fn persist(&self, store: &Store, input: MemoryInput) -> Result<String> {
        let started = std::time::Instant::now();
        let result = self.persist_inner(store, input);
        record_adapter_call(crate::telemetry::events::ADAPTER_PERSIST, started, result.is_ok());
        result
    }

    fn persist_inner(&self, store: &Store, input: MemoryInput) -> Result<String> {
        Self::validate_input(&input)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let subject = iri_ref(&memory_iri(&id));
        let level = ConfidenceLevel::from_numeric(input.confidence.clamp(0.0, 1.0));
        let now = Utc::now();

        let mut triples = vec![
            format!("{subject} <{RDF_TYPE}> <{}> .", class_iri(input.memory_type)),
            format!("{subject} <{}> {} .", predicate_iri(PRED_SUMMARY), str_literal(&input.content)),
            format!(
                "{subject} <{}> <{}> .",
                predicate_iri(PRED_HAS_CONFIDENCE),
                confidence_level_iri(level)
            ),
            format!(
                "{subject} <{}> <{}> .",
                predicate_iri(PRED_HAS_SOURCE_TYPE),
                source_kind_iri(input.source_type)
            ),
            format!(
                "{subject} <{}> <{}> .",
                predicate_iri(PRED_ASSERTED_IN),
                session_iri(&input.session_id)
            ),
            format!("{subject} <{}> {} .", predicate_iri(PRED_HAS_TIMESTAMP), now_literal(now)),
            format!("{subject} <{}> {} .", predicate_iri(PRED_ACCESS_COUNT), int_literal(0)),
        ];
        if let Some(agent) = &input.agent_id {
            triples.push(format!(
                "{subject} <{}> <{}> .",
                predicate_iri(PRED_ASSERTED_BY),
                agent_iri(agent)
            ));
        }
        if let Some(project) = &input.project_id {
            triples.push(format!(
                "{subject} <{}> <{}> .",
                predicate_iri(PRED_APPLIES_TO_PROJECT),
                project_iri(project)
            ));
        }
        if let Some(rationale) = &input.rationale {
            triples.push(format!(
                "{subject} <{}> {} .",
                predicate_iri(PRED_RATIONALE),
                str_literal(rationale)
            ));
        }
        for reference in &input.evidence_refs {
            triples.push(format!(
                "{subject} <{}> <{}> .",
                predicate_iri(PRED_DERIVED_FROM),
                evidence_iri(reference)
            ));
        }

        let update = format!("INSERT DATA {{ {} }}", triples.join(" "));
        store
            .update(update.as_str())
            .map_err(|e| Error::AdapterInternal(format!("persist failed: {e}")))?;
        Ok(id)
    }

    fn solutions_to_memory(
        &self,
        store: &Store,
        id: &str,
    ) -> Result<Option<StoredMemory>> {
        let subject = memory_iri(id);
        let query = format!(
            "SELECT ?p ?o WHERE {{ <{subject}> ?p ?o }}",
        );
        let results = store
            .query(query.as_str())
            .map_err(|e| Error::AdapterInternal(format!("query failed: {e}")))?;
        let QueryResults::Solutions(solutions) = results else {
            return Err(Error::AdapterInternal("expected solutions".into()));
        };

        let mut memory_type = None;
        let mut content = None;
        let mut confidence = None;
        let mut source_type = None;
        let mut session = None;
        let mut agent_id = None;
        let mut project_id = None;
        let mut rationale = None;
        let mut created_at = None;
        let mut superseded_by = None;
        let mut superseded_at = None;
        let mut access_count = 0u64;
        let mut last_accessed = None;
        let mut found = false;

        for solution in solutions {
            let solution = solution.map_err(|e| Error::AdapterInternal(e.to_string()))?;
            found = true;
            let Some(p) = solution.get("p") else { continue };
            let Some(o) = solution.get("o") else { continue };
            let pred = term_to_string(p);
            let val = term_to_string(o);
            match pred.as_str() {
                RDF_TYPE => memory_type = kind_from_class_iri(&val),
                _ if pred == predicate_iri(PRED_SUMMARY) => content = Some(val),
                _ if pred == predicate_iri(PRED_HAS_CONFIDENCE) => {
                    confidence = confidence_level_from_iri(&val);
                }
                _ if pred == predicate_iri(PRED_HAS_SOURCE_TYPE) => {
                    source_type = source_kind_from_iri(&val);
                }
                _ if pred == predicate_iri(PRED_ASSERTED_IN) => session = Some(val),
                _ if pred == predicate_iri(PRED_ASSERTED_BY) => agent_id = Some(val),
                _ if pred == predicate_iri(PRED_APPLIES_TO_PROJECT) => project_id = Some(val),
                _ if pred == predicate_iri(PRED_RATIONALE) => rationale = Some(val),
                _ if pred == predicate_iri(PRED_HAS_TIMESTAMP) => created_at = parse_datetime(&val),
                _ if pred == predicate_iri(PRED_SUPERSEDED_BY) => superseded_by = Some(val),
                _ if pred == predicate_iri(PRED_SUPERSEDED_AT) => superseded_at = parse_datetime(&val),
                _ if pred == predicate_iri(PRED_ACCESS_COUNT) => {
                    access_count = val.parse().unwrap_or(0);
                }
                _ if pred == predicate_iri(PRED_LAST_ACCESSED) => last_accessed = parse_datetime(&val),
                _ => {}
            }
        }

        if !found {
            return Ok(None);
        }

        Ok(Some(StoredMemory {
            id: id.to_string(),
            content: content.unwrap_or_default(),
            memory_type: memory_type.unwrap_or(MemoryKind::Unknown),
            confidence: confidence.unwrap_or(ConfidenceLevel::Low),
            source_type: source_type.unwrap_or(SourceKind::Agent),
            session_id: session
                .and_then(|s| s.strip_prefix(&format!("{NAMESPACE}session_")).map(str::to_string))
                .unwrap_or_default(),
            agent_id,
            project_id,
            rationale,
            evidence_refs: Vec::new(),
            created_at: created_at.unwrap_or_else(Utc::now),
            superseded_by,
            superseded_at,
            access_count,
            last_accessed,
        }))
    }

    /// Look up a memory by id, with no session check (internal use by the
    /// scoped variant and by relationship traversal).
    pub fn query_by_id(&self, store: &Store, id: &str) -> Result<StoredMemory> {
        self.solutions_to_memory(store, id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Look up a memory by id, failing with `SessionMismatch` if it
    /// belongs to a different session.
    pub fn query_by_id_scoped(&self, store: &Store, id: &str, session_id: &str) -> Result<StoredMemory> {
        let memory = self.query_by_id(store, id)?;
        if memory.session_id != session_id {
            return Err(Error::SessionMismatch(session_id.to_string()));
        }
        Ok(memory)
    }

    fn select_ids(&self, store: &Store, session_id: &str, opts: &QueryOptions) -> Result<Vec<String>> {
        let mut filters = vec![format!(
            "?m <{}> <{}> .",
            predicate_iri(PRED_ASSERTED_IN),
            session_iri(session_id)
        )];
        if let Some(kind) = opts.memory_type {
            filters.push(format!("?m <{RDF_TYPE}> <{}> .", class_iri(kind)));
        }
        if !opts.include_superseded {
            filters.push(format!("FILTER NOT EXISTS {{ ?m <{}> ?_repl }}", predicate_iri(PRED_SUPERSEDED_BY)));
        }
        if let Some(min_confidence) = opts.min_confidence {
            let level = ConfidenceLevel::from_numeric(min_confidence);
            let levels: Vec<ConfidenceLevel> = [ConfidenceLevel::High, ConfidenceLevel::Medium, ConfidenceLevel::Low]
                .into_iter()
                .filter(|l| l.to_numeric() >= level.to_numeric())
                .collect();
            let values = levels
                .iter()
                .map(|l| format!("<{}>", confidence_level_iri(*l)))
                .collect::<Vec<_>>()
                .join(" ");
            filters.push(format!(
                "?m <{}> ?conf . FILTER(?conf IN ({values}))",
                predicate_iri(PRED_HAS_CONFIDENCE)
            ));
        }
        if let Some(q) = &opts.query {
            filters.push(format!(
                "?m <{}> ?summary . FILTER(CONTAINS(?summary, \"{}\"))",
                predicate_iri(PRED_SUMMARY),
                escape_literal(q)
            ));
        }

        let limit = opts.limit.map(|l| format!(" LIMIT {l}")).unwrap_or_default();
        let query = format!("SELECT DISTINCT ?m WHERE {{ {} }}{limit}", filters.join(" "));

        let results = store
            .query(query.as_str())
            .map_err(|e| Error::AdapterInternal(format!("query failed: {e}")))?;
        let QueryResults::Solutions(solutions) = results else {
            return Err(Error::AdapterInternal("expected solutions".into()));
        };
        let mut ids = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| Error::AdapterInternal(e.to_string()))?;
            if let Some(Term::NamedNode(n)) = solution.get("m") {
                if let Some(id) = n.as_str().strip_prefix(&format!("{NAMESPACE}memory_")) {
                    ids.push(id.to_string());
                }
            }
        }
        Ok(ids)
    }

    /// Session-scoped query filtered by `memory_type`.
    pub fn query_by_type(&self, store: &Store, session_id: &str, memory_type: MemoryKind, mut opts: QueryOptions) -> Result<Vec<StoredMemory>> {
        opts.memory_type = Some(memory_type);
        self.query_all(store, session_id, opts)
    }

    /// Session-scoped query over every memory matching `opts`.
    pub fn query_all(&self, store: &Store, session_id: &str, opts: QueryOptions) -> Result<Vec<StoredMemory>> {
        let started = std::time::Instant::now();
        let result = self.query_all_inner(store, session_id, opts);
        record_adapter_call(crate::telemetry::events::ADAPTER_QUERY, started, result.is_ok());
        result
    }

    fn query_all_inner(&self, store: &Store, session_id: &str, opts: QueryOptions) -> Result<Vec<StoredMemory>> {
        if session_id.trim().is_empty() {
            return Err(Error::InvalidInput("session_id must not be empty".into()));
        }
        let ids = self.select_ids(store, session_id, &opts)?;
        let mut memories = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(memory) = self.solutions_to_memory(store, &id)? {
                memories.push(memory);
            }
        }
        Ok(memories)
    }

    /// Mark `id` as superseded by `replacement_id` (or [`deleted_marker_iri`]
    /// when `None`). Idempotent: setting twice leaves the same state.
    pub fn supersede(&self, store: &Store, id: &str, replacement_id: Option<&str>, session_id: &str) -> Result<()> {
        let started = std::time::Instant::now();
        let result = self.supersede_inner(store, id, replacement_id, session_id);
        record_adapter_call(crate::telemetry::events::ADAPTER_SUPERSEDE, started, result.is_ok());
        result
    }

    fn supersede_inner(&self, store: &Store, id: &str, replacement_id: Option<&str>, session_id: &str) -> Result<()> {
        let existing = self.query_by_id_scoped(store, id, session_id)?;
        if existing.superseded_by.is_some() {
            return Ok(());
        }
        let subject = iri_ref(&memory_iri(id));
        let replacement = match replacement_id {
            Some(rid) => memory_iri(rid),
            None => deleted_marker_iri(),
        };
        let now = Utc::now();
        let update = format!(
            "INSERT DATA {{ {subject} <{}> <{replacement}> . {subject} <{}> {} . }}",
            predicate_iri(PRED_SUPERSEDED_BY),
            predicate_iri(PRED_SUPERSEDED_AT),
            now_literal(now)
        );
        store
            .update(update.as_str())
            .map_err(|e| Error::AdapterInternal(format!("supersede failed: {e}")))?;
        Ok(())
    }

    /// Soft-delete: equivalent to `supersede(id, None, session_id)`.
    pub fn delete(&self, store: &Store, id: &str, session_id: &str) -> Result<()> {
        self.supersede(store, id, None, session_id)
    }

    /// Increment `accessCount` and refresh `lastAccessed`. Tolerant of
    /// concurrent increments losing at most one write (spec §4.8).
    pub fn record_access(&self, store: &Store, id: &str, session_id: &str) -> Result<()> {
        let existing = self.query_by_id_scoped(store, id, session_id)?;
        let subject = iri_ref(&memory_iri(id));
        let now = Utc::now();
        let mut delete_clause = String::new();
        if existing.last_accessed.is_some() {
            delete_clause.push_str(&format!(
                "{subject} <{}> ?old_access . {subject} <{}> ?old_count .",
                predicate_iri(PRED_LAST_ACCESSED),
                predicate_iri(PRED_ACCESS_COUNT)
            ));
        } else {
            delete_clause.push_str(&format!("{subject} <{}> ?old_count .", predicate_iri(PRED_ACCESS_COUNT)));
        }
        let update = format!(
            "DELETE {{ {delete_clause} }} INSERT {{ {subject} <{}> {} . {subject} <{}> {} . }} WHERE {{ {subject} <{}> ?old_count . OPTIONAL {{ {subject} <{}> ?old_access }} }}",
            predicate_iri(PRED_LAST_ACCESSED),
            now_literal(now),
            predicate_iri(PRED_ACCESS_COUNT),
            int_literal(existing.access_count + 1),
            predicate_iri(PRED_ACCESS_COUNT),
            predicate_iri(PRED_LAST_ACCESSED),
        );
        store
            .update(update.as_str())
            .map_err(|e| Error::AdapterInternal(format!("record_access failed: {e}")))?;
        Ok(())
    }

    /// Count memories in `session_id`, optionally including superseded
    /// ones.
    pub fn count(&self, store: &Store, session_id: &str, include_superseded: bool) -> Result<u64> {
        let opts = QueryOptions {
            include_superseded,
            ..Default::default()
        };
        Ok(self.select_ids(store, session_id, &opts)?.len() as u64)
    }

    /// Follow `relationship` out of `id`, returning the related memory ids.
    pub fn query_related(&self, store: &Store, session_id: &str, id: &str, relationship: Relationship) -> Result<Vec<String>> {
        self.query_by_id_scoped(store, id, session_id)?;
        let subject = iri_ref(&memory_iri(id));
        let query = format!(
            "SELECT ?o WHERE {{ {subject} <{}> ?o }}",
            relationship.predicate_iri()
        );
        let results = store
            .query(query.as_str())
            .map_err(|e| Error::AdapterInternal(format!("query_related failed: {e}")))?;
        let QueryResults::Solutions(solutions) = results else {
            return Err(Error::AdapterInternal("expected solutions".into()));
        };
        let mut out = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| Error::AdapterInternal(e.to_string()))?;
            if let Some(term) = solution.get("o") {
                let val = term_to_string(term);
                if let Some(rid) = val.strip_prefix(&format!("{NAMESPACE}memory_")) {
                    out.push(rid.to_string());
                }
            }
        }
        Ok(out)
    }

    /// Aggregate statistics over the whole store (not session-scoped — the
    /// store itself is already one session's worth of triples).
    pub fn get_stats(&self, store: &Store) -> Result<AdapterStats> {
        let query = "SELECT (COUNT(*) AS ?c) (COUNT(DISTINCT ?s) AS ?s_count) (COUNT(DISTINCT ?p) AS ?p_count) (COUNT(DISTINCT ?o) AS ?o_count) WHERE { ?s ?p ?o }";
        let results = store
            .query(query)
            .map_err(|e| Error::AdapterInternal(format!("get_stats failed: {e}")))?;
        let QueryResults::Solutions(mut solutions) = results else {
            return Err(Error::AdapterInternal("expected solutions".into()));
        };
        let Some(solution) = solutions.next() else {
            return Ok(AdapterStats::default());
        };
        let solution = solution.map_err(|e| Error::AdapterInternal(e.to_string()))?;
        let get_count = |name: &str| -> u64 {
            solution
                .get(name)
                .map(term_to_string)
                .and_then(|s| s.parse().ok())
                .unwrap_or(0)
        };
        Ok(AdapterStats {
            triple_count: get_count("c"),
            distinct_subjects: get_count("s_count"),
            distinct_predicates: get_count("p_count"),
            distinct_objects: get_count("o_count"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store() -> Store {
        Store::new().expect("in-memory store")
    }

    fn sample_input(session_id: &str, content: &str) -> MemoryInput {
        MemoryInput {
            content: content.to_string(),
            memory_type: MemoryKind::Fact,
            confidence: 0.9,
            source_type: SourceKind::Agent,
            session_id: session_id.to_string(),
            agent_id: None,
            project_id: None,
            rationale: None,
            evidence_refs: vec![],
        }
    }

    #[test]
    fn persist_then_get_roundtrips() {
        let store = new_store();
        let adapter = TripleStoreAdapter::new();
        let id = adapter.persist(&store, sample_input("s1", "alpha")).unwrap();
        let memory = adapter.query_by_id(&store, &id).unwrap();
        assert_eq!(memory.content, "alpha");
        assert_eq!(memory.memory_type, MemoryKind::Fact);
        assert_eq!(memory.confidence, ConfidenceLevel::High);
        assert_eq!(memory.session_id, "s1");
    }

    #[test]
    fn session_isolation_holds() {
        let store_a = new_store();
        let store_b = new_store();
        let adapter = TripleStoreAdapter::new();
        adapter.persist(&store_a, sample_input("a", "alpha")).unwrap();
        adapter.persist(&store_b, sample_input("b", "beta")).unwrap();

        let in_a = adapter.query_by_type(&store_a, "a", MemoryKind::Fact, QueryOptions::default()).unwrap();
        let in_b = adapter.query_by_type(&store_b, "b", MemoryKind::Fact, QueryOptions::default()).unwrap();
        assert_eq!(in_a.len(), 1);
        assert_eq!(in_a[0].content, "alpha");
        assert_eq!(in_b.len(), 1);
        assert_eq!(in_b[0].content, "beta");
    }

    #[test]
    fn cross_session_access_is_rejected() {
        let store = new_store();
        let adapter = TripleStoreAdapter::new();
        let id = adapter.persist(&store, sample_input("a", "alpha")).unwrap();
        let result = adapter.query_by_id_scoped(&store, &id, "b");
        assert!(matches!(result, Err(Error::SessionMismatch(_))));
    }

    #[test]
    fn supersede_is_idempotent_and_hides_by_default() {
        let store = new_store();
        let adapter = TripleStoreAdapter::new();
        let id1 = adapter.persist(&store, sample_input("a", "m1")).unwrap();
        let id2 = adapter.persist(&store, sample_input("a", "m2")).unwrap();

        adapter.supersede(&store, &id1, Some(&id2), "a").unwrap();
        adapter.supersede(&store, &id1, Some(&id2), "a").unwrap();

        let visible = adapter.query_all(&store, "a", QueryOptions::default()).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].content, "m2");

        let all = adapter
            .query_all(&store, "a", QueryOptions { include_superseded: true, ..Default::default() })
            .unwrap();
        assert_eq!(all.len(), 2);
        let superseded = all.iter().find(|m| m.id == id1).unwrap();
        assert_eq!(superseded.superseded_by.as_deref(), Some(memory_iri(&id2).as_str()));
    }

    #[test]
    fn record_access_increments_and_sets_last_accessed() {
        let store = new_store();
        let adapter = TripleStoreAdapter::new();
        let id = adapter.persist(&store, sample_input("a", "m1")).unwrap();
        adapter.record_access(&store, &id, "a").unwrap();
        let memory = adapter.query_by_id(&store, &id).unwrap();
        assert_eq!(memory.access_count, 1);
        assert!(memory.last_accessed.is_some());
        adapter.record_access(&store, &id, "a").unwrap();
        let memory = adapter.query_by_id(&store, &id).unwrap();
        assert_eq!(memory.access_count, 2);
    }

    #[test]
    fn count_is_monotonic_under_pure_writes() {
        let store = new_store();
        let adapter = TripleStoreAdapter::new();
        let mut last = 0;
        for i in 0..5 {
            adapter.persist(&store, sample_input("a", &format!("m{i}"))).unwrap();
            let count = adapter.count(&store, "a", true).unwrap();
            assert!(count >= last);
            last = count;
        }
    }
}
