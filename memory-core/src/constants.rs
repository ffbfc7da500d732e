//! Default configuration values.
//!
//! Centralized so the scorer, promotion engine, triggers, store manager,
//! and context builder don't each re-declare magic numbers the spec pins
//! down independently.

/// Default promotion score threshold (spec §4.5).
pub const DEFAULT_PROMOTION_THRESHOLD: f64 = 0.6;

/// Lowered threshold used on session close, to flush more aggressively
/// (spec §4.6, Open Question resolved in DESIGN.md).
pub const DEFAULT_CLOSE_THRESHOLD: f64 = 0.4;

/// Maximum promotion candidates persisted per run (spec §4.5).
pub const DEFAULT_MAX_PROMOTIONS_PER_RUN: usize = 20;

/// Periodic promotion timer interval, milliseconds (spec §4.6).
pub const DEFAULT_PROMOTION_INTERVAL_MS: u64 = 30_000;

/// Maximum pending items (implicit + agent-decision) before eviction
/// kicks in (spec §3.2).
pub const DEFAULT_MAX_PENDING_ITEMS: usize = 100;

/// Maximum access-log entries retained (spec §3.2).
pub const DEFAULT_MAX_ACCESS_LOG_ENTRIES: usize = 1000;

/// Recency half-life-ish time constant, hours (spec §4.4).
pub const RECENCY_TAU_HOURS: f64 = 24.0;

/// Frequency normalization cap (spec §4.4).
pub const DEFAULT_FREQUENCY_CAP: u32 = 10;

/// Default scorer weights; need not sum to 1 (spec §4.4).
pub const DEFAULT_SCORER_WEIGHT: f64 = 0.25;

/// Maximum concurrently open long-term stores (spec §4.7).
pub const DEFAULT_MAX_OPEN_STORES: usize = 100;

/// Idle timeout before a store is closed by the cleanup tick, milliseconds
/// (spec §4.7).
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Cleanup tick interval, milliseconds (spec §4.7).
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Per-store close timeout during shutdown, milliseconds (spec §5).
pub const DEFAULT_STORE_CLOSE_TIMEOUT_MS: u64 = 5_000;

/// Default total token budget for a built context (spec §4.9).
pub const DEFAULT_TOTAL_BUDGET: usize = 32_000;
/// Default system-prompt component budget.
pub const DEFAULT_SYSTEM_BUDGET: usize = 2_000;
/// Default conversation-tail component budget.
pub const DEFAULT_CONVERSATION_BUDGET: usize = 20_000;
/// Default working-context component budget.
pub const DEFAULT_WORKING_BUDGET: usize = 4_000;
/// Default long-term-memories component budget.
pub const DEFAULT_LONG_TERM_BUDGET: usize = 6_000;

/// Default number of conversation messages considered for the tail read
/// before budget truncation.
pub const DEFAULT_CONVERSATION_TAIL_LEN: usize = 100;

/// Default long-term memory fetch limit with no `query_hint` (spec §4.9).
pub const DEFAULT_MEMORY_FETCH_LIMIT: usize = 5;
/// Default long-term memory fetch limit with a `query_hint` (spec §4.9).
pub const DEFAULT_MEMORY_FETCH_LIMIT_WITH_HINT: usize = 10;
/// Default confidence floor applied when there is no `query_hint`.
pub const DEFAULT_MEMORY_CONFIDENCE_FLOOR: f64 = 0.7;
