//! Extracts working-context updates from assistant response text,
//! asynchronously, after each stream ends (C13).
//!
//! The rule set is deliberately small and auditable (spec §9 Design
//! Notes): each pattern below is documented alongside the
//! [`crate::types::ContextKey`] it targets and the confidence it stages
//! at. A miss is silent; a hit calls [`crate::session::SessionState::put_context`]
//! with `source = inferred`, letting [`crate::types::ContextKey::inferred_suggested_type`]
//! assign the promotion-candidate type exactly as it would for any other
//! inferred update.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::session::SessionState;
use crate::types::{ContextKey, ContextSource};
use crate::working_context::{PutOptions, WorkingContext};

/// One extraction rule: a capturing regex, the [`ContextKey`] a match
/// updates, and the confidence to stage the update at.
struct ExtractionPattern {
    name: &'static str,
    regex: Regex,
    key: ContextKey,
    confidence: f64,
}

/// The fixed pattern table (Glossary "Extraction patterns"):
///
/// - a fenced code block with a language tag → [`ContextKey::PrimaryLanguage`]
/// - a file path in backticks → [`ContextKey::ActiveFile`]
/// - "we decided/chose/will use X" → [`ContextKey::UserIntent`]
/// - "error: …" / "failed: …" → [`ContextKey::ActiveErrors`] (ephemeral)
/// - a line matching a project convention marker → [`ContextKey::DiscoveredPatterns`]
fn default_patterns() -> Vec<ExtractionPattern> {
    let build = |name, pattern: &str, key, confidence| ExtractionPattern {
        name,
        regex: Regex::new(pattern).expect("extraction pattern is valid regex"),
        key,
        confidence,
    };
    vec![
        build(
            "code_fence_language",
            r"```(?P<content>[A-Za-z][A-Za-z0-9_+-]*)\s*\n",
            ContextKey::PrimaryLanguage,
            0.7,
        ),
        build(
            "backtick_file_path",
            r"`(?P<content>[\w./-]+\.[A-Za-z0-9_]+)`",
            ContextKey::ActiveFile,
            0.7,
        ),
        build(
            "decision_phrase",
            r"(?i)\bwe(?:'ve| have)? (?:decided|chose|will use) (?P<content>[^.\n]+)",
            ContextKey::UserIntent,
            0.6,
        ),
        build(
            "error_line",
            r"(?i)\b(?:error|failed):\s*(?P<content>[^.\n]+)",
            ContextKey::ActiveErrors,
            0.8,
        ),
        build(
            "convention_marker",
            r"(?i)\b(?:convention|pattern):\s*(?P<content>[^.\n]+)",
            ContextKey::DiscoveredPatterns,
            0.7,
        ),
    ]
}

/// One extracted working-context update, before it's applied.
#[derive(Debug, Clone)]
pub struct ExtractedUpdate {
    pub pattern_name: &'static str,
    pub key: ContextKey,
    pub value: Value,
    pub confidence: f64,
}

/// Regex-driven extraction over assistant response text.
pub struct ResponseProcessor {
    patterns: Vec<ExtractionPattern>,
}

impl Default for ResponseProcessor {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }
}

impl ResponseProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every pattern against `text`, returning every match (a single
    /// response can trigger more than one pattern, and a pattern can match
    /// more than once — later matches for the same key simply overwrite
    /// earlier ones when applied, matching [`WorkingContext::put`]'s
    /// update semantics).
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<ExtractedUpdate> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for pattern in &self.patterns {
            for captures in pattern.regex.captures_iter(text) {
                if let Some(content) = captures.name("content") {
                    out.push(ExtractedUpdate {
                        pattern_name: pattern.name,
                        key: pattern.key,
                        value: Value::String(content.as_str().trim().to_string()),
                        confidence: pattern.confidence,
                    });
                }
            }
        }
        out
    }

    /// Extract and apply updates directly to a [`WorkingContext`],
    /// synchronously. Used by unit tests and by callers that already hold
    /// the lock `SessionState` would otherwise acquire.
    pub fn process(&self, text: &str, working_context: &mut WorkingContext) -> usize {
        let updates = self.extract(text);
        let applied = updates.len();
        for update in updates {
            working_context.put(
                update.key,
                update.value,
                PutOptions {
                    source: Some(ContextSource::Inferred),
                    confidence: Some(update.confidence),
                    memory_type: None,
                },
            );
        }
        applied
    }

    /// Fire-and-forget variant: extraction and staging happen on a spawned
    /// task so the caller's response-handling path never waits on it.
    /// Failures are logged and never propagated (spec §7
    /// `transient_extractor`).
    pub fn spawn_process(self: Arc<Self>, text: String, session: SessionState) -> JoinHandle<()> {
        tokio::spawn(async move {
            let updates = self.extract(&text);
            if updates.is_empty() {
                debug!("response processor found no extraction matches");
                return;
            }
            let mut keys = Vec::with_capacity(updates.len());
            for update in updates {
                keys.push(update.key.to_string());
                session
                    .put_context(
                        update.key,
                        update.value,
                        PutOptions {
                            source: Some(ContextSource::Inferred),
                            confidence: Some(update.confidence),
                            memory_type: None,
                        },
                    )
                    .await;
            }
            debug!(?keys, "response processor staged working-context updates");
        })
    }
}

/// Logged at warning by callers that catch a panic out of a detached
/// [`ResponseProcessor::spawn_process`] task; the stream itself must never
/// observe the failure.
pub fn log_extractor_failure(session_id: &str, error: &dyn std::fmt::Display) {
    warn!(session_id, %error, "response processor task failed");
}
