//! SPARQL query templates and the IRI ↔ atom mapping tables they're built
//! from (C11). This is the single source of truth for predicate and class
//! IRIs: [`crate::triple_store::adapter`] and
//! [`crate::triple_store::ontology`] both depend on it, never the reverse.

use crate::types::iri::NAMESPACE;
use crate::types::{ConfidenceLevel, MemoryKind, SourceKind};

/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const PRED_SUMMARY: &str = "summary";
pub const PRED_HAS_CONFIDENCE: &str = "hasConfidence";
pub const PRED_HAS_SOURCE_TYPE: &str = "hasSourceType";
pub const PRED_ASSERTED_IN: &str = "assertedIn";
pub const PRED_ASSERTED_BY: &str = "assertedBy";
pub const PRED_APPLIES_TO_PROJECT: &str = "appliesToProject";
pub const PRED_HAS_TIMESTAMP: &str = "hasTimestamp";
pub const PRED_DERIVED_FROM: &str = "derivedFrom";
pub const PRED_SUPERSEDED_BY: &str = "supersededBy";
pub const PRED_SUPERSEDED_AT: &str = "supersededAt";
pub const PRED_ACCESS_COUNT: &str = "accessCount";
pub const PRED_LAST_ACCESSED: &str = "lastAccessed";
pub const PRED_RATIONALE: &str = "rationale";

/// The well-known individual used as the object of `supersededBy` when a
/// memory is soft-deleted without a replacement.
#[must_use]
pub fn deleted_marker_iri() -> String {
    format!("{NAMESPACE}DeletedMarker")
}

/// Build the full predicate IRI for a bare local name.
#[must_use]
pub fn predicate_iri(local_name: &str) -> String {
    format!("{NAMESPACE}{local_name}")
}

/// `MemoryKind` → RDF class IRI (CamelCase local name).
#[must_use]
pub fn class_iri(kind: MemoryKind) -> String {
    let local = match kind {
        MemoryKind::Fact => "Fact",
        MemoryKind::Assumption => "Assumption",
        MemoryKind::Hypothesis => "Hypothesis",
        MemoryKind::Discovery => "Discovery",
        MemoryKind::Risk => "Risk",
        MemoryKind::Unknown => "Unknown",
        MemoryKind::Decision => "Decision",
        MemoryKind::ArchitecturalDecision => "ArchitecturalDecision",
        MemoryKind::Convention => "Convention",
        MemoryKind::CodingStandard => "CodingStandard",
        MemoryKind::LessonLearned => "LessonLearned",
        MemoryKind::Error => "Error",
        MemoryKind::Bug => "Bug",
    };
    format!("{NAMESPACE}{local}")
}

/// RDF class IRI → `MemoryKind`, the inverse of [`class_iri`].
#[must_use]
pub fn kind_from_class_iri(iri: &str) -> Option<MemoryKind> {
    let local = iri.strip_prefix(NAMESPACE)?;
    Some(match local {
        "Fact" => MemoryKind::Fact,
        "Assumption" => MemoryKind::Assumption,
        "Hypothesis" => MemoryKind::Hypothesis,
        "Discovery" => MemoryKind::Discovery,
        "Risk" => MemoryKind::Risk,
        "Unknown" => MemoryKind::Unknown,
        "Decision" => MemoryKind::Decision,
        "ArchitecturalDecision" => MemoryKind::ArchitecturalDecision,
        "Convention" => MemoryKind::Convention,
        "CodingStandard" => MemoryKind::CodingStandard,
        "LessonLearned" => MemoryKind::LessonLearned,
        "Error" => MemoryKind::Error,
        "Bug" => MemoryKind::Bug,
        _ => return None,
    })
}

/// `ConfidenceLevel` → the IRI of its ontology individual.
#[must_use]
pub fn confidence_level_iri(level: ConfidenceLevel) -> String {
    let local = match level {
        ConfidenceLevel::High => "ConfidenceHigh",
        ConfidenceLevel::Medium => "ConfidenceMedium",
        ConfidenceLevel::Low => "ConfidenceLow",
    };
    format!("{NAMESPACE}{local}")
}

/// Inverse of [`confidence_level_iri`].
#[must_use]
pub fn confidence_level_from_iri(iri: &str) -> Option<ConfidenceLevel> {
    let local = iri.strip_prefix(NAMESPACE)?;
    Some(match local {
        "ConfidenceHigh" => ConfidenceLevel::High,
        "ConfidenceMedium" => ConfidenceLevel::Medium,
        "ConfidenceLow" => ConfidenceLevel::Low,
        _ => return None,
    })
}

/// `SourceKind` → the IRI of its ontology individual.
#[must_use]
pub fn source_kind_iri(source: SourceKind) -> String {
    let local = match source {
        SourceKind::User => "SourceUser",
        SourceKind::Agent => "SourceAgent",
        SourceKind::Tool => "SourceTool",
        SourceKind::External => "SourceExternal",
    };
    format!("{NAMESPACE}{local}")
}

/// Inverse of [`source_kind_iri`].
#[must_use]
pub fn source_kind_from_iri(iri: &str) -> Option<SourceKind> {
    let local = iri.strip_prefix(NAMESPACE)?;
    Some(match local {
        "SourceUser" => SourceKind::User,
        "SourceAgent" => SourceKind::Agent,
        "SourceTool" => SourceKind::Tool,
        "SourceExternal" => SourceKind::External,
        _ => return None,
    })
}

/// The closed set of relationship predicates `query_related` can traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Refines,
    Confirms,
    Contradicts,
    HasAlternative,
    SelectedAlternative,
    HasTradeOff,
    JustifiedBy,
    HasRootCause,
    ProducedLesson,
    RelatedError,
    DerivedFrom,
    SupersededBy,
}

impl Relationship {
    #[must_use]
    pub fn predicate_local_name(self) -> &'static str {
        match self {
            Relationship::Refines => "refines",
            Relationship::Confirms => "confirms",
            Relationship::Contradicts => "contradicts",
            Relationship::HasAlternative => "hasAlternative",
            Relationship::SelectedAlternative => "selectedAlternative",
            Relationship::HasTradeOff => "hasTradeOff",
            Relationship::JustifiedBy => "justifiedBy",
            Relationship::HasRootCause => "hasRootCause",
            Relationship::ProducedLesson => "producedLesson",
            Relationship::RelatedError => "relatedError",
            Relationship::DerivedFrom => PRED_DERIVED_FROM,
            Relationship::SupersededBy => PRED_SUPERSEDED_BY,
        }
    }

    #[must_use]
    pub fn predicate_iri(self) -> String {
        predicate_iri(self.predicate_local_name())
    }

    #[must_use]
    pub fn from_local_name(name: &str) -> Option<Self> {
        Some(match name {
            "refines" => Relationship::Refines,
            "confirms" => Relationship::Confirms,
            "contradicts" => Relationship::Contradicts,
            "has_alternative" | "hasAlternative" => Relationship::HasAlternative,
            "selected_alternative" | "selectedAlternative" => Relationship::SelectedAlternative,
            "has_trade_off" | "hasTradeOff" => Relationship::HasTradeOff,
            "justified_by" | "justifiedBy" => Relationship::JustifiedBy,
            "has_root_cause" | "hasRootCause" => Relationship::HasRootCause,
            "produced_lesson" | "producedLesson" => Relationship::ProducedLesson,
            "related_error" | "relatedError" => Relationship::RelatedError,
            "derived_from" | "derivedFrom" => Relationship::DerivedFrom,
            "superseded_by" | "supersededBy" => Relationship::SupersededBy,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_iri_roundtrips_for_every_kind() {
        for kind in MemoryKind::all() {
            let iri = class_iri(*kind);
            assert_eq!(kind_from_class_iri(&iri), Some(*kind));
        }
    }

    #[test]
    fn confidence_level_iri_roundtrips() {
        for level in [ConfidenceLevel::High, ConfidenceLevel::Medium, ConfidenceLevel::Low] {
            let iri = confidence_level_iri(level);
            assert_eq!(confidence_level_from_iri(&iri), Some(level));
        }
    }

    #[test]
    fn relationship_local_name_roundtrips() {
        for rel in [
            Relationship::Refines,
            Relationship::HasAlternative,
            Relationship::ProducedLesson,
            Relationship::SupersededBy,
        ] {
            let iri = rel.predicate_iri();
            assert!(iri.starts_with(NAMESPACE));
        }
        assert_eq!(
            Relationship::from_local_name("has_trade_off"),
            Some(Relationship::HasTradeOff)
        );
    }
}
