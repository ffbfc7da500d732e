//! Top-level configuration, loaded from TOML (ambient config stack).
//!
//! Every field has a default pulled from [`crate::constants`], so a
//! partial config file — or none at all — still produces a fully usable
//! [`MemoryConfig`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLEANUP_INTERVAL_MS, DEFAULT_CLOSE_THRESHOLD, DEFAULT_IDLE_TIMEOUT_MS,
    DEFAULT_MAX_OPEN_STORES, DEFAULT_MAX_PENDING_ITEMS, DEFAULT_MAX_PROMOTIONS_PER_RUN,
    DEFAULT_PROMOTION_INTERVAL_MS, DEFAULT_PROMOTION_THRESHOLD, DEFAULT_STORE_CLOSE_TIMEOUT_MS,
};
use crate::error::{Error, Result};
use crate::scorer::ScorerWeights;
use crate::context_builder::ContextBudgets;

fn default_promotion_threshold() -> f64 {
    DEFAULT_PROMOTION_THRESHOLD
}
fn default_close_threshold() -> f64 {
    DEFAULT_CLOSE_THRESHOLD
}
fn default_max_promotions_per_run() -> usize {
    DEFAULT_MAX_PROMOTIONS_PER_RUN
}
fn default_promotion_interval_ms() -> u64 {
    DEFAULT_PROMOTION_INTERVAL_MS
}
fn default_max_pending_items() -> usize {
    DEFAULT_MAX_PENDING_ITEMS
}
fn default_max_open_stores() -> usize {
    DEFAULT_MAX_OPEN_STORES
}
fn default_idle_timeout_ms() -> u64 {
    DEFAULT_IDLE_TIMEOUT_MS
}
fn default_cleanup_interval_ms() -> u64 {
    DEFAULT_CLEANUP_INTERVAL_MS
}
fn default_store_close_timeout_ms() -> u64 {
    DEFAULT_STORE_CLOSE_TIMEOUT_MS
}
fn default_base_path() -> String {
    "./memory-data".to_string()
}

/// Promotion-pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionConfig {
    #[serde(default = "default_promotion_threshold")]
    pub threshold: f64,
    #[serde(default = "default_close_threshold")]
    pub close_threshold: f64,
    #[serde(default = "default_max_promotions_per_run")]
    pub max_per_run: usize,
    #[serde(default = "default_promotion_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub scorer: ScorerWeights,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            threshold: default_promotion_threshold(),
            close_threshold: default_close_threshold(),
            max_per_run: default_max_promotions_per_run(),
            interval_ms: default_promotion_interval_ms(),
            scorer: ScorerWeights::default(),
        }
    }
}

/// Store-pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_max_open_stores")]
    pub max_open_stores: usize,
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
    #[serde(default = "default_store_close_timeout_ms")]
    pub close_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            max_open_stores: default_max_open_stores(),
            idle_timeout_ms: default_idle_timeout_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
            close_timeout_ms: default_store_close_timeout_ms(),
        }
    }
}

/// Working-memory bounds, per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingMemoryConfig {
    #[serde(default = "default_max_pending_items")]
    pub max_pending_items: usize,
}

impl Default for WorkingMemoryConfig {
    fn default() -> Self {
        Self {
            max_pending_items: default_max_pending_items(),
        }
    }
}

/// Top-level configuration for a [`crate::facade::Memory`] instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub promotion: PromotionConfig,
    pub store: StoreConfig,
    pub working_memory: WorkingMemoryConfig,
    pub budgets: ContextBudgets,
}

impl MemoryConfig {
    /// Parse configuration from a TOML string; unset fields fall back to
    /// their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::InvalidInput(format!("invalid config: {e}")))
    }

    /// Read and parse a TOML config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

impl Serialize for ContextBudgets {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ContextBudgets", 5)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("system", &self.system)?;
        state.serialize_field("conversation", &self.conversation)?;
        state.serialize_field("working", &self.working)?;
        state.serialize_field("long_term", &self.long_term)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ContextBudgets {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(default)]
        struct Raw {
            total: usize,
            system: usize,
            conversation: usize,
            working: usize,
            long_term: usize,
        }
        impl Default for Raw {
            fn default() -> Self {
                let b = ContextBudgets::default();
                Self {
                    total: b.total,
                    system: b.system,
                    conversation: b.conversation,
                    working: b.working,
                    long_term: b.long_term,
                }
            }
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(ContextBudgets {
            total: raw.total,
            system: raw.system,
            conversation: raw.conversation,
            working: raw.working,
            long_term: raw.long_term,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_produces_defaults() {
        let config = MemoryConfig::from_toml("").unwrap();
        assert_eq!(config.promotion.threshold, DEFAULT_PROMOTION_THRESHOLD);
        assert_eq!(config.store.max_open_stores, DEFAULT_MAX_OPEN_STORES);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = MemoryConfig::from_toml(
            r#"
            [promotion]
            threshold = 0.75
            "#,
        )
        .unwrap();
        assert_eq!(config.promotion.threshold, 0.75);
        assert_eq!(config.promotion.max_per_run, DEFAULT_MAX_PROMOTIONS_PER_RUN);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(MemoryConfig::from_toml("not = [valid toml").is_err());
    }
}
