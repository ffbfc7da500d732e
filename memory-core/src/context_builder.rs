//! Assembles a token-budgeted prompt context from all four memory tiers
//! (C12).
//!
//! Each component gets its own budget; when a component doesn't fit, it's
//! truncated independently rather than the whole context being rejected.
//! Conversation drops oldest-first; working context and long-term
//! memories drop lowest-confidence-first.

use chrono::{DateTime, Utc};

use crate::constants::{
    DEFAULT_CONVERSATION_BUDGET, DEFAULT_CONVERSATION_TAIL_LEN, DEFAULT_LONG_TERM_BUDGET,
    DEFAULT_MEMORY_CONFIDENCE_FLOOR, DEFAULT_MEMORY_FETCH_LIMIT, DEFAULT_MEMORY_FETCH_LIMIT_WITH_HINT,
    DEFAULT_SYSTEM_BUDGET, DEFAULT_TOTAL_BUDGET, DEFAULT_WORKING_BUDGET,
};
use crate::token_counter::estimate_tokens;
use crate::triple_store::StoredMemory;
use crate::working_context::WorkingContextItem;

/// One turn of conversation fed into [`ContextBuilder::build`].
#[derive(Debug, Clone)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-component token budgets. Defaults mirror spec §4.9; `total` is a
/// soft ceiling callers can check the assembled context against.
#[derive(Debug, Clone, Copy)]
pub struct ContextBudgets {
    pub total: usize,
    pub system: usize,
    pub conversation: usize,
    pub working: usize,
    pub long_term: usize,
}

impl Default for ContextBudgets {
    fn default() -> Self {
        Self {
            total: DEFAULT_TOTAL_BUDGET,
            system: DEFAULT_SYSTEM_BUDGET,
            conversation: DEFAULT_CONVERSATION_BUDGET,
            working: DEFAULT_WORKING_BUDGET,
            long_term: DEFAULT_LONG_TERM_BUDGET,
        }
    }
}

/// Inputs to one context build.
#[derive(Debug, Clone)]
pub struct BuildInput {
    pub system_prompt: String,
    pub conversation: Vec<ConversationMessage>,
    pub working_context: Vec<WorkingContextItem>,
    pub memories: Vec<StoredMemory>,
    pub query_hint: Option<String>,
}

/// What got dropped to fit budget, for observability.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncationReport {
    pub conversation_dropped: usize,
    pub working_context_dropped: usize,
    pub memories_dropped: usize,
}

/// Per-component token counts after truncation, step 4 of spec §4.9.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounts {
    pub system: usize,
    pub conversation: usize,
    pub working: usize,
    pub long_term: usize,
}

/// The assembled, budget-fitted context.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub system_prompt: String,
    pub conversation: Vec<ConversationMessage>,
    pub working_context: Vec<WorkingContextItem>,
    pub memories: Vec<StoredMemory>,
    pub truncation: TruncationReport,
    pub token_counts: TokenCounts,
    pub budget: ContextBudgets,
}

/// How many long-term memories to fetch for a `recall` call, per spec
/// §4.9: a narrower, higher-confidence set with no hint, a wider set when
/// the caller supplies one.
#[must_use]
pub fn memory_fetch_limit(query_hint: Option<&str>) -> usize {
    if query_hint.is_some() {
        DEFAULT_MEMORY_FETCH_LIMIT_WITH_HINT
    } else {
        DEFAULT_MEMORY_FETCH_LIMIT
    }
}

/// Confidence floor to apply when there's no `query_hint` to narrow by.
#[must_use]
pub fn memory_confidence_floor(query_hint: Option<&str>) -> f64 {
    if query_hint.is_some() {
        0.0
    } else {
        DEFAULT_MEMORY_CONFIDENCE_FLOOR
    }
}

fn truncate_conversation(mut messages: Vec<ConversationMessage>, budget: usize) -> (Vec<ConversationMessage>, usize) {
    if messages.len() > DEFAULT_CONVERSATION_TAIL_LEN {
        let drop = messages.len() - DEFAULT_CONVERSATION_TAIL_LEN;
        messages.drain(0..drop);
    }
    let mut dropped = 0;
    while estimate_tokens(&render_conversation(&messages)) > budget && !messages.is_empty() {
        messages.remove(0);
        dropped += 1;
    }
    (messages, dropped)
}

fn render_conversation(messages: &[ConversationMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_working_context(items: &[WorkingContextItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}: {}", item.key, item.value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_memories(memories: &[StoredMemory]) -> String {
    memories
        .iter()
        .map(|m| format!("- [{:?}] {}", m.memory_type, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_by_confidence<T>(mut items: Vec<T>, budget: usize, confidence_of: impl Fn(&T) -> f64, render: impl Fn(&[T]) -> String) -> (Vec<T>, usize) {
    let mut dropped = 0;
    while estimate_tokens(&render(&items)) > budget && !items.is_empty() {
        let victim = items
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| confidence_of(a).partial_cmp(&confidence_of(b)).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, _)| idx);
        if let Some(idx) = victim {
            items.remove(idx);
            dropped += 1;
        } else {
            break;
        }
    }
    (items, dropped)
}

/// Builds and formats the assembled context from all four memory tiers
/// under a fixed set of per-component token budgets.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    budgets: ContextBudgets,
}

impl ContextBuilder {
    #[must_use]
    pub fn new(budgets: ContextBudgets) -> Self {
        Self { budgets }
    }

    #[must_use]
    pub fn budgets(&self) -> ContextBudgets {
        self.budgets
    }

    /// Assemble and truncate each component independently to fit its
    /// budget.
    #[must_use]
    pub fn build(&self, input: BuildInput) -> AssembledContext {
        let mut system_prompt = input.system_prompt;
        while estimate_tokens(&system_prompt) > self.budgets.system && !system_prompt.is_empty() {
            let cut = system_prompt.len() - system_prompt.len() / 8;
            system_prompt.truncate(cut.max(1));
        }

        let (conversation, conversation_dropped) = truncate_conversation(input.conversation, self.budgets.conversation);

        // Working context is not truncated: it is small and high-signal
        // (spec §4.9 step 5).
        let working_context = input.working_context;

        let (memories, memories_dropped) = truncate_by_confidence(
            input.memories,
            self.budgets.long_term,
            |m| m.confidence.to_numeric(),
            |items| render_memories(items),
        );

        let token_counts = TokenCounts {
            system: estimate_tokens(&system_prompt),
            conversation: estimate_tokens(&render_conversation(&conversation)),
            working: estimate_tokens(&render_working_context(&working_context)),
            long_term: estimate_tokens(&render_memories(&memories)),
        };

        AssembledContext {
            system_prompt,
            conversation,
            working_context,
            memories,
            truncation: TruncationReport {
                conversation_dropped,
                working_context_dropped: 0,
                memories_dropped,
            },
            token_counts,
            budget: self.budgets,
        }
    }

    /// Confidence badge text for a numeric confidence, per spec §4.9.
    fn confidence_badge(confidence: f64) -> &'static str {
        if confidence >= 0.8 {
            "(high confidence)"
        } else if confidence >= 0.5 {
            "(medium confidence)"
        } else {
            "(low confidence)"
        }
    }

    /// Render an assembled context into prompt markdown: `## Session
    /// Context` (key: value lines from working context) followed by `##
    /// Remembered Information` (type + confidence badge per long-term
    /// memory), per spec §4.9. An empty context formats to the empty
    /// string; each section is omitted if it has nothing to show.
    #[must_use]
    pub fn format_for_prompt(&self, assembled: &AssembledContext) -> String {
        let mut sections = Vec::new();
        if !assembled.system_prompt.is_empty() {
            sections.push(assembled.system_prompt.clone());
        }
        if !assembled.working_context.is_empty() {
            sections.push(format!("## Session Context\n{}", render_working_context(&assembled.working_context)));
        }
        if !assembled.memories.is_empty() {
            let lines = assembled
                .memories
                .iter()
                .map(|m| {
                    format!(
                        "- [{:?}] {} {}",
                        m.memory_type,
                        m.content,
                        Self::confidence_badge(m.confidence.to_numeric())
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("## Remembered Information\n{lines}"));
        }
        sections.join("\n\n")
    }
}
