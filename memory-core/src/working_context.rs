//! In-memory semantic scratchpad keyed by [`ContextKey`] (C2).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ContextKey, ContextSource, MemoryKind};

/// A single working-context entry and its bookkeeping metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingContextItem {
    pub key: ContextKey,
    pub value: Value,
    pub source: ContextSource,
    pub confidence: f64,
    pub access_count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub suggested_type: Option<MemoryKind>,
}

/// Optional fields accepted by [`WorkingContext::put`].
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub source: Option<ContextSource>,
    pub confidence: Option<f64>,
    pub memory_type: Option<MemoryKind>,
}

/// The working-context scratchpad. Owned exclusively by a session's state
/// holder; all mutation is expected to funnel through a single caller at a
/// time (see [`crate::session::SessionState`]).
#[derive(Debug, Default)]
pub struct WorkingContext {
    items: HashMap<ContextKey, WorkingContextItem>,
}

impl WorkingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update `key`. Preserves `first_seen` across updates,
    /// refreshes `last_accessed`, and bumps `access_count`. Confidence is
    /// clamped to `[0, 1]`. If `memory_type` isn't supplied, the suggested
    /// type is inferred from the key and source.
    pub fn put(&mut self, key: ContextKey, value: Value, opts: PutOptions) {
        let now = Utc::now();
        let source = opts.source.unwrap_or(ContextSource::Inferred);
        let confidence = opts.confidence.unwrap_or(1.0).clamp(0.0, 1.0);
        let suggested_type = opts
            .memory_type
            .map(Some)
            .unwrap_or_else(|| key.inferred_suggested_type(source));

        match self.items.get_mut(&key) {
            Some(existing) => {
                existing.value = value;
                existing.source = source;
                existing.confidence = confidence;
                existing.suggested_type = suggested_type;
                existing.last_accessed = now;
                existing.access_count += 1;
            }
            None => {
                self.items.insert(
                    key,
                    WorkingContextItem {
                        key,
                        value,
                        source,
                        confidence,
                        access_count: 1,
                        first_seen: now,
                        last_accessed: now,
                        suggested_type,
                    },
                );
            }
        }
    }

    /// Read `key`, bumping `access_count` and `last_accessed`.
    pub fn get(&mut self, key: ContextKey) -> Option<&WorkingContextItem> {
        if let Some(item) = self.items.get_mut(&key) {
            item.access_count += 1;
            item.last_accessed = Utc::now();
        }
        self.items.get(&key)
    }

    /// Read `key` without touching access bookkeeping.
    #[must_use]
    pub fn peek(&self, key: ContextKey) -> Option<&WorkingContextItem> {
        self.items.get(&key)
    }

    /// Remove `key`, returning its last value if present.
    pub fn delete(&mut self, key: ContextKey) -> Option<WorkingContextItem> {
        self.items.remove(&key)
    }

    #[must_use]
    pub fn get_item(&self, key: ContextKey) -> Option<&WorkingContextItem> {
        self.items.get(&key)
    }

    #[must_use]
    pub fn to_map(&self) -> HashMap<ContextKey, Value> {
        self.items
            .iter()
            .map(|(k, v)| (*k, v.value.clone()))
            .collect()
    }

    #[must_use]
    pub fn to_list(&self) -> Vec<WorkingContextItem> {
        self.items.values().cloned().collect()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn has_key(&self, key: ContextKey) -> bool {
        self.items.contains_key(&key)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// All items whose `suggested_type` is not `None` — the candidate pool
    /// for promotion (spec §4.5 step 1).
    #[must_use]
    pub fn promotion_candidates(&self) -> Vec<&WorkingContextItem> {
        self.items
            .values()
            .filter(|item| item.suggested_type.is_some())
            .collect()
    }
}
