//! Enumerations and small value types shared across the memory core (C1).
//!
//! This module is the single place that knows the *closed* vocabularies the
//! rest of the crate works with — memory kinds, confidence levels, access
//! kinds, and the fixed `ContextKey` set — plus the numeric mappings that
//! let the scorer and the triple-store adapter agree on what a "confidence
//! level" or a "salience" actually means.

pub mod iri;

use serde::{Deserialize, Serialize};

/// The kind of a long-term memory record, mirrored 1:1 onto an RDF class
/// name by [`crate::triple_store::queries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Fact,
    Assumption,
    Hypothesis,
    Discovery,
    Risk,
    Unknown,
    Decision,
    ArchitecturalDecision,
    Convention,
    CodingStandard,
    LessonLearned,
    Error,
    Bug,
}

impl MemoryKind {
    /// Salience weight used by [`crate::scorer::ImportanceScorer`] (spec §4.4).
    #[must_use]
    pub fn salience(self) -> f64 {
        match self {
            MemoryKind::ArchitecturalDecision
            | MemoryKind::CodingStandard
            | MemoryKind::Convention
            | MemoryKind::Decision
            | MemoryKind::LessonLearned
            | MemoryKind::Risk => 1.0,
            MemoryKind::Fact | MemoryKind::Discovery => 0.7,
            MemoryKind::Assumption | MemoryKind::Hypothesis => 0.4,
            MemoryKind::Unknown | MemoryKind::Error | MemoryKind::Bug => 0.3,
        }
    }

    /// All variants, used by config validation and tests.
    #[must_use]
    pub fn all() -> &'static [MemoryKind] {
        &[
            MemoryKind::Fact,
            MemoryKind::Assumption,
            MemoryKind::Hypothesis,
            MemoryKind::Discovery,
            MemoryKind::Risk,
            MemoryKind::Unknown,
            MemoryKind::Decision,
            MemoryKind::ArchitecturalDecision,
            MemoryKind::Convention,
            MemoryKind::CodingStandard,
            MemoryKind::LessonLearned,
            MemoryKind::Error,
            MemoryKind::Bug,
        ]
    }
}

/// A coarse confidence band, stored on long-term records; numeric
/// confidence is preserved in working/pending memory but is quantized to
/// one of these three levels on ingest into the triple store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Map a level back to its representative numeric confidence.
    #[must_use]
    pub fn to_numeric(self) -> f64 {
        match self {
            ConfidenceLevel::High => 0.9,
            ConfidenceLevel::Medium => 0.6,
            ConfidenceLevel::Low => 0.3,
        }
    }

    /// Band a numeric confidence into a level: `>=0.8` high, `>=0.5`
    /// medium, else low.
    #[must_use]
    pub fn from_numeric(value: f64) -> Self {
        if value >= 0.8 {
            ConfidenceLevel::High
        } else if value >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Who or what produced a [`crate::pending::PendingItem`] or
/// [`crate::working_context::WorkingContextItem`] at the long-term-record
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    User,
    Agent,
    Tool,
    External,
}

/// Provenance of a [`crate::working_context::WorkingContextItem`] value.
/// Distinct from [`SourceKind`]: this describes *how the value entered
/// working context*, not who asserted a long-term fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    Inferred,
    Explicit,
    Tool,
}

/// The kind of access recorded by [`crate::access_log::AccessLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
    Query,
}

/// Which tier of [`crate::pending::PendingMemories`] suggested a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionSource {
    Implicit,
    Agent,
}

/// The closed set of short working-context keys (spec §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    Framework,
    PrimaryLanguage,
    ProjectRoot,
    ActiveFile,
    UserIntent,
    CurrentTask,
    DiscoveredPatterns,
    FileRelationships,
    ActiveErrors,
    PendingQuestions,
}

impl ContextKey {
    /// All variants, in a stable order, for iteration and config validation.
    #[must_use]
    pub fn all() -> &'static [ContextKey] {
        &[
            ContextKey::Framework,
            ContextKey::PrimaryLanguage,
            ContextKey::ProjectRoot,
            ContextKey::ActiveFile,
            ContextKey::UserIntent,
            ContextKey::CurrentTask,
            ContextKey::DiscoveredPatterns,
            ContextKey::FileRelationships,
            ContextKey::ActiveErrors,
            ContextKey::PendingQuestions,
        ]
    }

    /// Infer the `suggested_type` for a value written under this key from
    /// the given provenance, per the Glossary's inference table. `None`
    /// means "ephemeral" — never a promotion candidate.
    #[must_use]
    pub fn inferred_suggested_type(self, source: ContextSource) -> Option<MemoryKind> {
        let _ = source; // only `tool` is documented to reach these keys in practice
        match self {
            ContextKey::Framework
            | ContextKey::PrimaryLanguage
            | ContextKey::ProjectRoot
            | ContextKey::ActiveFile => Some(MemoryKind::Fact),
            ContextKey::UserIntent | ContextKey::CurrentTask => Some(MemoryKind::Assumption),
            ContextKey::DiscoveredPatterns | ContextKey::FileRelationships => {
                Some(MemoryKind::Discovery)
            }
            ContextKey::ActiveErrors => None,
            ContextKey::PendingQuestions => Some(MemoryKind::Unknown),
        }
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContextKey::Framework => "framework",
            ContextKey::PrimaryLanguage => "primary_language",
            ContextKey::ProjectRoot => "project_root",
            ContextKey::ActiveFile => "active_file",
            ContextKey::UserIntent => "user_intent",
            ContextKey::CurrentTask => "current_task",
            ContextKey::DiscoveredPatterns => "discovered_patterns",
            ContextKey::FileRelationships => "file_relationships",
            ContextKey::ActiveErrors => "active_errors",
            ContextKey::PendingQuestions => "pending_questions",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ContextKey {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContextKey::all()
            .iter()
            .copied()
            .find(|k| k.to_string() == s)
            .ok_or_else(|| crate::error::Error::InvalidInput(format!("unknown context key: {s}")))
    }
}
