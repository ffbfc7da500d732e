//! Bounded newest-first access history (C4).

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AccessKind;

/// A single recorded access. `key` is either a [`crate::types::ContextKey`]
/// rendering or a long-term memory id — the log doesn't care which.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessEntry {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub access_kind: AccessKind,
}

/// Frequency/recency summary for one key.
#[derive(Debug, Clone, Copy)]
pub struct AccessStats {
    pub frequency: u64,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Newest-first, size-bounded log of accesses across a session.
#[derive(Debug)]
pub struct AccessLog {
    entries: VecDeque<AccessEntry>,
    max_entries: usize,
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MAX_ACCESS_LOG_ENTRIES)
    }
}

impl AccessLog {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1024)),
            max_entries,
        }
    }

    /// Record an access, dropping the oldest entry if the log is at
    /// capacity. New entries are inserted at the front (newest-first).
    pub fn record(&mut self, key: impl Into<String>, access_kind: AccessKind) {
        self.entries.push_front(AccessEntry {
            key: key.into(),
            timestamp: Utc::now(),
            access_kind,
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_back();
        }
    }

    #[must_use]
    pub fn get_frequency(&self, key: &str) -> u64 {
        self.entries.iter().filter(|e| e.key == key).count() as u64
    }

    #[must_use]
    pub fn get_recency(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.timestamp)
    }

    #[must_use]
    pub fn get_stats(&self, key: &str) -> AccessStats {
        AccessStats {
            frequency: self.get_frequency(key),
            last_accessed: self.get_recency(key),
        }
    }

    #[must_use]
    pub fn recent_accesses(&self, n: usize) -> Vec<&AccessEntry> {
        self.entries.iter().take(n).collect()
    }

    #[must_use]
    pub fn entries_for(&self, key: &str) -> Vec<&AccessEntry> {
        self.entries.iter().filter(|e| e.key == key).collect()
    }

    #[must_use]
    pub fn unique_keys(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut keys = Vec::new();
        for entry in &self.entries {
            if seen.insert(entry.key.clone()) {
                keys.push(entry.key.clone());
            }
        }
        keys
    }

    #[must_use]
    pub fn access_type_counts(&self, key: &str) -> HashMap<AccessKind, u64> {
        let mut counts = HashMap::new();
        for entry in self.entries.iter().filter(|e| e.key == key) {
            *counts.entry(entry.access_kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }
}
