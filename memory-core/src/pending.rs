//! Two-tier pending-memory staging area (C3).
//!
//! Implicit items are scored candidates keyed by id; agent-decision items
//! are explicit, pre-approved, and always promoted ahead of them.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{MemoryKind, PromotionSource, SourceKind};

/// A staged candidate awaiting promotion to the long-term store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingItem {
    pub id: String,
    pub content: String,
    pub memory_type: MemoryKind,
    pub confidence: f64,
    pub source_type: SourceKind,
    pub importance_score: f64,
    pub suggested_by: PromotionSource,
    pub rationale: Option<String>,
    pub evidence_refs: Vec<String>,
}

/// Fields accepted by [`PendingMemories::add_implicit`].
#[derive(Debug, Clone)]
pub struct NewImplicitItem {
    pub id: Option<String>,
    pub content: String,
    pub memory_type: MemoryKind,
    pub confidence: f64,
    pub source_type: SourceKind,
    pub importance_score: Option<f64>,
    pub rationale: Option<String>,
    pub evidence_refs: Vec<String>,
}

/// Fields accepted by [`PendingMemories::add_agent_decision`].
#[derive(Debug, Clone)]
pub struct NewAgentDecision {
    pub content: String,
    pub memory_type: MemoryKind,
    pub confidence: f64,
    pub source_type: SourceKind,
    pub rationale: Option<String>,
    pub evidence_refs: Vec<String>,
}

/// Generates a `pending-<unix_ms>-<8 lowercase hex>` id.
fn generate_pending_id() -> String {
    let ts = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random();
    format!("pending-{ts}-{suffix:08x}")
}

/// Extract the embedded millisecond timestamp from a generated id, used
/// for deterministic eviction tie-breaking ("oldest by id-embedded
/// timestamp").
fn embedded_timestamp(id: &str) -> i64 {
    id.strip_prefix("pending-")
        .and_then(|rest| rest.split('-').next())
        .and_then(|ts| ts.parse().ok())
        .unwrap_or(i64::MAX)
}

/// Staging area for candidate memories, split into an implicit (scored)
/// tier and an agent-decision (pre-approved) tier.
#[derive(Debug, Default)]
pub struct PendingMemories {
    implicit: HashMap<String, PendingItem>,
    agent_decisions: Vec<PendingItem>,
    max_items: usize,
}

impl PendingMemories {
    #[must_use]
    pub fn new(max_items: usize) -> Self {
        Self {
            implicit: HashMap::new(),
            agent_decisions: Vec::new(),
            max_items,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.implicit.len() + self.agent_decisions.len()
    }

    /// Evict the implicit entry with the lowest `importance_score`, ties
    /// broken by oldest id-embedded timestamp.
    fn evict_lowest_implicit(&mut self) {
        let victim = self
            .implicit
            .values()
            .min_by(|a, b| {
                a.importance_score
                    .partial_cmp(&b.importance_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| embedded_timestamp(&a.id).cmp(&embedded_timestamp(&b.id)))
            })
            .map(|item| item.id.clone());
        if let Some(id) = victim {
            self.implicit.remove(&id);
        }
    }

    /// Stage an implicit (scored) candidate. If the staging area is at
    /// capacity, evicts the lowest-importance implicit item first.
    pub fn add_implicit(&mut self, new: NewImplicitItem) -> Result<String> {
        if new.content.trim().is_empty() {
            return Err(Error::InvalidInput("pending item content is empty".into()));
        }
        if !(0.0..=1.0).contains(&new.confidence) {
            return Err(Error::InvalidInput(
                "pending item confidence must be in [0, 1]".into(),
            ));
        }
        if self.size() >= self.max_items {
            self.evict_lowest_implicit();
        }
        let id = new.id.unwrap_or_else(generate_pending_id);
        let item = PendingItem {
            id: id.clone(),
            content: new.content,
            memory_type: new.memory_type,
            confidence: new.confidence,
            source_type: new.source_type,
            importance_score: new.importance_score.unwrap_or(0.5).clamp(0.0, 1.0),
            suggested_by: PromotionSource::Implicit,
            rationale: new.rationale,
            evidence_refs: new.evidence_refs,
        };
        self.implicit.insert(id.clone(), item);
        Ok(id)
    }

    /// Stage an agent-decision (explicit, pre-approved) candidate. Always
    /// importance 1.0, bypassing the scorer.
    pub fn add_agent_decision(&mut self, new: NewAgentDecision) -> Result<String> {
        if new.content.trim().is_empty() {
            return Err(Error::InvalidInput("pending item content is empty".into()));
        }
        if self.size() >= self.max_items {
            self.evict_lowest_implicit();
        }
        let id = generate_pending_id();
        let item = PendingItem {
            id: id.clone(),
            content: new.content,
            memory_type: new.memory_type,
            confidence: new.confidence,
            source_type: new.source_type,
            importance_score: 1.0,
            suggested_by: PromotionSource::Agent,
            rationale: new.rationale,
            evidence_refs: new.evidence_refs,
        };
        self.agent_decisions.push(item);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PendingItem> {
        self.implicit
            .get(id)
            .or_else(|| self.agent_decisions.iter().find(|item| item.id == id))
    }

    /// Update the importance score of an implicit item in place.
    pub fn update_score(&mut self, id: &str, score: f64) -> Result<()> {
        let item = self
            .implicit
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        item.importance_score = score.clamp(0.0, 1.0);
        Ok(())
    }

    #[must_use]
    pub fn list_implicit(&self) -> Vec<&PendingItem> {
        self.implicit.values().collect()
    }

    #[must_use]
    pub fn list_agent_decisions(&self) -> &[PendingItem] {
        &self.agent_decisions
    }

    /// All agent-decision items, followed by implicit items scoring at or
    /// above `threshold`, sorted by importance descending (spec §4.2).
    #[must_use]
    pub fn ready_for_promotion(&self, threshold: f64) -> Vec<PendingItem> {
        let mut implicit: Vec<PendingItem> = self
            .implicit
            .values()
            .filter(|item| item.importance_score >= threshold)
            .cloned()
            .collect();
        implicit.sort_by(|a, b| {
            b.importance_score
                .partial_cmp(&a.importance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut out = self.agent_decisions.clone();
        out.extend(implicit);
        out
    }

    /// Remove promoted ids from the implicit map; empties the
    /// agent-decision queue entirely if any of its items were promoted.
    pub fn clear_promoted(&mut self, ids: &[String]) {
        for id in ids {
            self.implicit.remove(id);
        }
        if self
            .agent_decisions
            .iter()
            .any(|item| ids.contains(&item.id))
        {
            self.agent_decisions.clear();
        }
    }

    pub fn clear(&mut self) {
        self.implicit.clear();
        self.agent_decisions.clear();
    }
}

impl PendingItem {
    /// The staging timestamp embedded in this item's id, used as the
    /// recency anchor when rescoring an implicit item that the access log
    /// has no entry for yet.
    #[must_use]
    pub fn first_seen(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(embedded_timestamp(&self.id))
    }
}
