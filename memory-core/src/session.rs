//! Per-session aggregate root over the short-term memory tiers (C15).
//!
//! A [`SessionState`] is an `Arc<Mutex<SessionInner>>` behind a thin
//! handle: every mutation goes through the single mutex, so a session is
//! always internally consistent, while distinct sessions never contend
//! with each other — there is one mutex per session, not one global lock.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::access_log::AccessLog;
use crate::constants::{DEFAULT_CONVERSATION_TAIL_LEN, DEFAULT_MAX_ACCESS_LOG_ENTRIES, DEFAULT_MAX_PENDING_ITEMS};
use crate::context_builder::ConversationMessage;
use crate::pending::{NewAgentDecision, NewImplicitItem, PendingMemories};
use crate::promotion::{PromotionRunReport, PeriodicPromotion};
use crate::scorer::ImportanceScorer;
use crate::types::{AccessKind, ContextKey, ContextSource};
use crate::working_context::{PutOptions, WorkingContext, WorkingContextItem};

/// Cumulative promotion activity for a session, surfaced to operators via
/// [`SessionState::get_promotion_stats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PromotionStats {
    pub runs: u64,
    pub promoted: u64,
    pub failed: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}

/// A point-in-time copy of everything a session holds in short-term
/// memory, for debugging and for the CLI's inspection commands (spec
/// §3.2).
#[derive(Debug, Clone)]
pub struct SessionStateSnapshot {
    pub working_context: Vec<WorkingContextItem>,
    pub pending_memories: usize,
    pub access_log_len: usize,
}

/// The mutable state a session owns, guarded by a single mutex.
pub struct SessionInner {
    pub working_context: WorkingContext,
    pub pending: PendingMemories,
    pub access_log: AccessLog,
    pub scorer: ImportanceScorer,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ConversationMessage>,
    pub promotion_stats: PromotionStats,
    promotion_handle: Option<PeriodicPromotion>,
}

impl SessionInner {
    fn new() -> Self {
        Self {
            working_context: WorkingContext::new(),
            pending: PendingMemories::new(DEFAULT_MAX_PENDING_ITEMS),
            access_log: AccessLog::new(DEFAULT_MAX_ACCESS_LOG_ENTRIES),
            scorer: ImportanceScorer::default(),
            created_at: Utc::now(),
            messages: Vec::new(),
            promotion_stats: PromotionStats::default(),
            promotion_handle: None,
        }
    }
}

/// A cheap-to-clone handle to one session's short-term state. Cloning
/// shares the same underlying mutex; it does not fork state.
#[derive(Clone)]
pub struct SessionState {
    session_id: Arc<str>,
    inner: Arc<Mutex<SessionInner>>,
    last_active: Arc<std::sync::Mutex<Instant>>,
}

impl SessionState {
    #[must_use]
    pub fn new(session_id: impl Into<Arc<str>>) -> Self {
        Self {
            session_id: session_id.into(),
            inner: Arc::new(Mutex::new(SessionInner::new())),
            last_active: Arc::new(std::sync::Mutex::new(Instant::now())),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// How long it's been since any mutation touched this session.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_active.lock().expect("last_active lock poisoned").elapsed()
    }

    fn touch(&self) {
        *self.last_active.lock().expect("last_active lock poisoned") = Instant::now();
    }

    /// Lock the inner state for exclusive access. Callers should hold the
    /// guard for as short a time as possible; it serializes every other
    /// operation on this session.
    pub async fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().await
    }

    /// Write a working-context value, bumping the access log.
    pub async fn put_context(&self, key: ContextKey, value: Value, opts: PutOptions) {
        self.touch();
        let mut inner = self.lock().await;
        inner.working_context.put(key, value, opts);
        inner.access_log.record(key.to_string(), AccessKind::Write);
    }

    /// Read a working-context value, bumping the access log.
    pub async fn get_context(&self, key: ContextKey) -> Option<WorkingContextItem> {
        self.touch();
        let mut inner = self.lock().await;
        inner.access_log.record(key.to_string(), AccessKind::Read);
        inner.working_context.get(key).cloned()
    }

    /// Read a working-context value without side effects.
    pub async fn peek_context(&self, key: ContextKey) -> Option<WorkingContextItem> {
        let inner = self.lock().await;
        inner.working_context.peek(key).cloned()
    }

    /// Stage an implicit candidate, scored using this session's recency
    /// and frequency signals for the same key (falls back to a fresh
    /// score input when there's no prior access history).
    pub async fn stage_implicit(&self, new: NewImplicitItem, source: ContextSource) -> crate::error::Result<String> {
        let _ = source;
        self.touch();
        let mut inner = self.lock().await;
        inner.pending.add_implicit(new)
    }

    /// Stage an explicit agent decision, which always bypasses the score
    /// threshold at promotion time.
    pub async fn stage_agent_decision(&self, new: NewAgentDecision) -> crate::error::Result<String> {
        self.touch();
        let mut inner = self.lock().await;
        inner.pending.add_agent_decision(new)
    }

    /// Record a long-term memory access (read/write/query) against this
    /// session's access log, for later recency/frequency scoring.
    pub async fn record_access(&self, key: impl Into<String>, kind: AccessKind) {
        self.touch();
        let mut inner = self.lock().await;
        inner.access_log.record(key, kind);
    }

    /// Whether this session currently has enough pending items to force
    /// an out-of-band promotion run.
    pub async fn pending_at_limit(&self) -> bool {
        let inner = self.lock().await;
        crate::promotion::memory_limit_reached(inner.pending.size())
    }

    /// Append a turn to the session's conversation log, bounded to the
    /// last [`DEFAULT_CONVERSATION_TAIL_LEN`] turns.
    pub async fn append_message(&self, role: impl Into<String>, content: impl Into<String>) {
        self.touch();
        let mut inner = self.lock().await;
        inner.messages.push(ConversationMessage {
            role: role.into(),
            content: content.into(),
            timestamp: Utc::now(),
        });
        let len = inner.messages.len();
        if len > DEFAULT_CONVERSATION_TAIL_LEN {
            inner.messages.drain(0..len - DEFAULT_CONVERSATION_TAIL_LEN);
        }
    }

    /// The conversation tail recorded so far, oldest first.
    pub async fn get_messages(&self) -> Vec<ConversationMessage> {
        let inner = self.lock().await;
        inner.messages.clone()
    }

    /// Every current working-context entry, including ephemeral keys.
    pub async fn get_all_context(&self) -> Vec<WorkingContextItem> {
        let inner = self.lock().await;
        inner.working_context.to_list()
    }

    /// Drop all working-context entries. Used at session close, after any
    /// final promotion run has already staged what it needs.
    pub async fn clear_context(&self) {
        let mut inner = self.lock().await;
        inner.working_context.clear();
    }

    /// A point-in-time snapshot of this session's short-term state.
    pub async fn get_snapshot(&self) -> SessionStateSnapshot {
        let inner = self.lock().await;
        SessionStateSnapshot {
            working_context: inner.working_context.to_list(),
            pending_memories: inner.pending.size(),
            access_log_len: inner.access_log.size(),
        }
    }

    /// Cumulative promotion activity recorded against this session.
    pub async fn get_promotion_stats(&self) -> PromotionStats {
        let inner = self.lock().await;
        inner.promotion_stats
    }

    /// Fold the outcome of a promotion run into this session's running
    /// stats. Called by whoever drove the run (periodic timer, explicit
    /// trigger, or the facade's `promote` entry point).
    pub async fn record_promotion_run(&self, report: &PromotionRunReport) {
        let mut inner = self.lock().await;
        inner.promotion_stats.runs += 1;
        inner.promotion_stats.promoted += report.promoted.len() as u64;
        inner.promotion_stats.failed += report.failed.len() as u64;
        inner.promotion_stats.last_run_at = Some(Utc::now());
    }

    /// Start a background timer that invokes `tick` every `interval`
    /// (C7 periodic trigger). Replaces any timer already running.
    /// `tick` is supplied by the caller because driving a promotion run
    /// needs the store pool and promotion engine, which this type doesn't
    /// own.
    pub async fn enable_promotion<F, Fut>(&self, interval: Duration, tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let periodic = PeriodicPromotion::spawn(interval, tick);
        let mut inner = self.lock().await;
        inner.promotion_handle = Some(periodic);
    }

    /// Stop this session's periodic promotion timer, if one is running.
    pub async fn disable_promotion(&self) {
        let mut inner = self.lock().await;
        if let Some(handle) = inner.promotion_handle.take() {
            handle.cancel();
        }
    }
}
