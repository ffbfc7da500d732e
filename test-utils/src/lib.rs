//! Shared fixture builders for `memory-core` integration tests.
//!
//! Keeps the `tests` crate's scenario files focused on behavior instead of
//! constructor boilerplate: a [`tempfile::TempDir`]-backed [`Memory`], and
//! small builders for the inputs its facade accepts.

use memory_core::config::MemoryConfig;
use memory_core::pending::{NewAgentDecision, NewImplicitItem};
use memory_core::types::{MemoryKind, SourceKind};
use memory_core::{Memory, RememberInput};
use std::sync::Arc;
use tempfile::TempDir;

/// A [`Memory`] facade rooted in a freshly created temp directory. The
/// directory is held alive for as long as this fixture is; dropping it
/// cleans up the on-disk stores.
pub struct MemoryFixture {
    pub memory: Arc<Memory>,
    _tmp: TempDir,
}

impl MemoryFixture {
    /// Build a fixture with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    /// Build a fixture from a caller-supplied config, overriding only
    /// `store.base_path` to point at the fixture's temp directory.
    #[must_use]
    pub fn with_config(mut config: MemoryConfig) -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir for memory fixture");
        config.store.base_path = tmp.path().to_string_lossy().to_string();
        Self {
            memory: Memory::new(config),
            _tmp: tmp,
        }
    }
}

impl Default for MemoryFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal valid [`RememberInput`] for `content` at `confidence`, typed
/// as a fact from an agent. Override fields on the returned struct for
/// anything more specific.
#[must_use]
pub fn remember_input(content: &str, confidence: f64) -> RememberInput {
    RememberInput {
        content: content.to_string(),
        memory_type: MemoryKind::Fact,
        confidence,
        source_type: SourceKind::Agent,
        agent_id: None,
        project_id: None,
        rationale: None,
        evidence_refs: vec![],
    }
}

/// An implicit pending candidate at a given importance, for staging and
/// promotion-threshold tests.
#[must_use]
pub fn implicit_item(content: &str, importance: f64) -> NewImplicitItem {
    NewImplicitItem {
        id: None,
        content: content.to_string(),
        memory_type: MemoryKind::Fact,
        confidence: 0.8,
        source_type: SourceKind::Agent,
        importance_score: Some(importance),
        rationale: None,
        evidence_refs: vec![],
    }
}

/// An agent-decision pending candidate, which always bypasses the score
/// threshold at promotion time.
#[must_use]
pub fn agent_decision(content: &str, memory_type: MemoryKind) -> NewAgentDecision {
    NewAgentDecision {
        content: content.to_string(),
        memory_type,
        confidence: 0.9,
        source_type: SourceKind::Agent,
        rationale: None,
        evidence_refs: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_opens_an_isolated_store() {
        let fixture = MemoryFixture::new();
        let id = fixture
            .memory
            .remember("s1", remember_input("the project uses axum", 0.9))
            .await
            .unwrap();
        assert_eq!(fixture.memory.count("s1", false).await.unwrap(), 1);
        assert!(!id.is_empty());
    }
}
