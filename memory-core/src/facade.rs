//! The public entry point: `Memory` ties the session registry, the
//! triple-store pool, the promotion engine, and the context builder
//! together into the operations described in the Glossary (§6).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use tokio::task::JoinHandle;

use crate::config::MemoryConfig;
use crate::context_builder::{AssembledContext, BuildInput, ContextBudgets, ContextBuilder, ConversationMessage, memory_confidence_floor, memory_fetch_limit};
use crate::error::Result;
use crate::promotion::{PromotionEngine, PromotionRunReport, TriggerKind};
use crate::response_processor::ResponseProcessor;
use crate::scorer::ImportanceScorer;
use crate::session::SessionState;
use crate::store::{StoreManager, StoreManagerConfig};
use crate::triple_store::{AdapterStats, MemoryInput, QueryOptions, Relationship, StoredMemory, TripleStoreAdapter};
use crate::types::{AccessKind, MemoryKind, SourceKind};

/// Fields accepted by [`Memory::remember`].
#[derive(Debug, Clone)]
pub struct RememberInput {
    pub content: String,
    pub memory_type: MemoryKind,
    pub confidence: f64,
    pub source_type: SourceKind,
    pub agent_id: Option<String>,
    pub project_id: Option<String>,
    pub rationale: Option<String>,
    pub evidence_refs: Vec<String>,
}

/// Fields accepted by [`Memory::recall`].
#[derive(Debug, Clone, Default)]
pub struct RecallInput {
    pub system_prompt: String,
    pub conversation: Vec<ConversationMessage>,
    pub query_hint: Option<String>,
}

/// The two-tier session memory facade.
pub struct Memory {
    sessions: SyncMutex<HashMap<String, SessionState>>,
    store_manager: Arc<StoreManager>,
    engine: Arc<PromotionEngine>,
    context_builder: Arc<ContextBuilder>,
    response_processor: Arc<ResponseProcessor>,
    adapter: TripleStoreAdapter,
}

impl Memory {
    /// Build a facade from a parsed [`MemoryConfig`].
    #[must_use]
    pub fn new(config: MemoryConfig) -> Arc<Self> {
        let store_manager = Arc::new(StoreManager::new(StoreManagerConfig {
            base_path: config.store.base_path.into(),
            max_open_stores: config.store.max_open_stores,
            idle_timeout: std::time::Duration::from_millis(config.store.idle_timeout_ms),
            cleanup_interval: std::time::Duration::from_millis(config.store.cleanup_interval_ms),
            close_timeout: std::time::Duration::from_millis(config.store.close_timeout_ms),
        }));
        let scorer = ImportanceScorer::new(config.promotion.scorer);
        let engine = Arc::new(PromotionEngine::new(scorer, config.promotion.max_per_run));
        let context_builder = Arc::new(ContextBuilder::new(ContextBudgets {
            total: config.budgets.total,
            system: config.budgets.system,
            conversation: config.budgets.conversation,
            working: config.budgets.working,
            long_term: config.budgets.long_term,
        }));
        Arc::new(Self {
            sessions: SyncMutex::new(HashMap::new()),
            store_manager,
            engine,
            context_builder,
            response_processor: Arc::new(ResponseProcessor::new()),
            adapter: TripleStoreAdapter::new(),
        })
    }

    /// Get or create the in-process [`SessionState`] handle for
    /// `session_id`. Registry insertion is the only contended path; once a
    /// handle exists, callers clone it and never touch the registry lock
    /// again.
    #[must_use]
    pub fn session(&self, session_id: &str) -> SessionState {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(session_id))
            .clone()
    }

    #[must_use]
    pub fn store_manager(&self) -> &Arc<StoreManager> {
        &self.store_manager
    }

    /// Persist an explicit long-term memory, bypassing the pending/scoring
    /// pipeline — this is an assertion the caller already trusts.
    pub async fn remember(&self, session_id: &str, input: RememberInput) -> Result<String> {
        let store = self.store_manager.get_or_create(session_id).await?;
        self.adapter.persist(
            &store,
            MemoryInput {
                content: input.content,
                memory_type: input.memory_type,
                confidence: input.confidence,
                source_type: input.source_type,
                session_id: session_id.to_string(),
                agent_id: input.agent_id,
                project_id: input.project_id,
                rationale: input.rationale,
                evidence_refs: input.evidence_refs,
            },
        )
    }

    /// Fetch relevant long-term memories, merge in working context and the
    /// conversation tail, and return a budget-fitted, ready-to-render
    /// context.
    pub async fn recall(&self, session_id: &str, input: RecallInput) -> Result<AssembledContext> {
        let store = self.store_manager.get_or_create(session_id).await?;
        let limit = memory_fetch_limit(input.query_hint.as_deref());
        let floor = memory_confidence_floor(input.query_hint.as_deref());
        let memories = self.adapter.query_all(
            &store,
            session_id,
            QueryOptions {
                min_confidence: Some(floor),
                limit: Some(limit),
                query: input.query_hint.clone(),
                ..Default::default()
            },
        )?;
        for memory in &memories {
            let _ = self.adapter.record_access(&store, &memory.id, session_id);
        }

        let session = self.session(session_id);
        session.record_access(format!("recall:{session_id}"), AccessKind::Query).await;
        let working_context = {
            let inner = session.lock().await;
            inner.working_context.to_list()
        };

        Ok(self.context_builder.build(BuildInput {
            system_prompt: input.system_prompt,
            conversation: input.conversation,
            working_context,
            memories,
            query_hint: input.query_hint,
        }))
    }

    /// Soft-delete a long-term memory.
    pub async fn forget(&self, session_id: &str, id: &str) -> Result<()> {
        let store = self.store_manager.get_or_create(session_id).await?;
        self.adapter.delete(&store, id, session_id)
    }

    /// Mark `id` as superseded by `replacement_id`.
    pub async fn supersede(&self, session_id: &str, id: &str, replacement_id: &str) -> Result<()> {
        let store = self.store_manager.get_or_create(session_id).await?;
        self.adapter.supersede(&store, id, Some(replacement_id), session_id)
    }

    /// Look up one long-term memory by id, scoped to `session_id`.
    pub async fn get(&self, session_id: &str, id: &str) -> Result<StoredMemory> {
        let store = self.store_manager.get_or_create(session_id).await?;
        self.adapter.query_by_id_scoped(&store, id, session_id)
    }

    /// Follow a relationship out of a long-term memory.
    pub async fn query_related(&self, session_id: &str, id: &str, relationship: Relationship) -> Result<Vec<String>> {
        let store = self.store_manager.get_or_create(session_id).await?;
        self.adapter.query_related(&store, session_id, id, relationship)
    }

    /// Triple-store-wide statistics for a session.
    pub async fn get_stats(&self, session_id: &str) -> Result<AdapterStats> {
        let store = self.store_manager.get_or_create(session_id).await?;
        self.adapter.get_stats(&store)
    }

    /// Count long-term memories in a session.
    pub async fn count(&self, session_id: &str, include_superseded: bool) -> Result<u64> {
        let store = self.store_manager.get_or_create(session_id).await?;
        self.adapter.count(&store, session_id, include_superseded)
    }

    /// Extract working-context updates out of agent response text and
    /// apply them, off the caller's critical path (C13).
    pub fn process_response(&self, session_id: &str, text: String) -> JoinHandle<()> {
        let session = self.session(session_id);
        let processor = Arc::clone(&self.response_processor);
        processor.spawn_process(text, session)
    }

    /// Render an assembled context (as returned by [`Self::recall`]) into
    /// prompt-ready markdown.
    #[must_use]
    pub fn format_context(&self, assembled: &AssembledContext) -> String {
        self.context_builder.format_for_prompt(assembled)
    }

    /// Run one promotion pass for `session_id`, triggered by `trigger`.
    ///
    /// Emits the `memory.promotion.{periodic,pause,close,limit,agent}`
    /// telemetry record named in spec §6, with candidate/promoted counts
    /// and run duration.
    pub async fn promote(&self, session_id: &str, trigger: TriggerKind) -> Result<PromotionRunReport> {
        let store = self.store_manager.get_or_create(session_id).await?;
        let session = self.session(session_id);
        let started = std::time::Instant::now();
        let report = {
            let mut inner = session.lock().await;
            self.engine.run(
                &store,
                session_id,
                &mut inner.working_context,
                &mut inner.pending,
                &inner.access_log,
                trigger.threshold(),
            )
        };
        let elapsed_us = started.elapsed().as_micros() as f64;
        let candidate_count = report.promoted.len() + report.failed.len();
        let telemetry = crate::telemetry::telemetry();
        telemetry.incr(crate::telemetry::events::promotion_trigger(trigger));
        telemetry.incr_by(crate::telemetry::events::PROMOTION_CANDIDATE_COUNT, candidate_count as u64);
        telemetry.incr_by(crate::telemetry::events::PROMOTION_PROMOTED_COUNT, report.promoted.len() as u64);
        telemetry.record(crate::telemetry::events::PROMOTION_DURATION_US, elapsed_us);
        session.record_promotion_run(&report).await;
        Ok(report)
    }

    /// Enable this session's periodic promotion timer at `interval_ms`,
    /// driving [`Self::promote`] with [`TriggerKind::Periodic`] on every
    /// tick (C7). Replaces any timer already running for the session.
    pub async fn enable_promotion(self: &Arc<Self>, session_id: &str, interval_ms: u64) {
        let session = self.session(session_id);
        let memory = Arc::clone(self);
        let session_id = session_id.to_string();
        session
            .enable_promotion(std::time::Duration::from_millis(interval_ms), move || {
                let memory = Arc::clone(&memory);
                let session_id = session_id.clone();
                async move {
                    if let Err(error) = memory.promote(&session_id, TriggerKind::Periodic).await {
                        tracing::warn!(session_id, %error, "periodic promotion run failed");
                    }
                }
            })
            .await;
    }

    /// Stop this session's periodic promotion timer, if one is running.
    pub async fn disable_promotion(&self, session_id: &str) {
        self.session(session_id).disable_promotion().await;
    }

    /// Cumulative promotion stats recorded for this session.
    pub async fn get_promotion_stats(&self, session_id: &str) -> crate::session::PromotionStats {
        self.session(session_id).get_promotion_stats().await
    }
}
