//! End-to-end context assembly through [`memory_core::Memory::recall`] and
//! [`memory_core::Memory::format_context`]: budget-fitted truncation and
//! prompt rendering driven entirely through the facade (spec §4.9).

use memory_core::context_builder::ConversationMessage;
use memory_core::facade::RecallInput;
use memory_core::types::{ContextKey, MemoryKind, SourceKind};
use memory_core::working_context::PutOptions;
use memory_test_utils::{remember_input, MemoryFixture};

fn message(role: &str, content: &str) -> ConversationMessage {
    ConversationMessage {
        role: role.to_string(),
        content: content.to_string(),
        timestamp: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn recall_surfaces_remembered_facts_above_the_confidence_floor() {
    let fixture = MemoryFixture::new();
    fixture
        .memory
        .remember("s1", remember_input("the project uses postgres", 0.9))
        .await
        .unwrap();
    fixture
        .memory
        .remember("s1", remember_input("a barely-confident guess", 0.2))
        .await
        .unwrap();

    let assembled = fixture
        .memory
        .recall(
            "s1",
            RecallInput {
                system_prompt: "you are a coding assistant".into(),
                conversation: vec![],
                query_hint: None,
            },
        )
        .await
        .unwrap();

    // No query hint: the confidence floor excludes the low-confidence guess.
    assert_eq!(assembled.memories.len(), 1);
    assert_eq!(assembled.memories[0].content, "the project uses postgres");
}

#[tokio::test]
async fn recall_merges_in_working_context_and_the_conversation_tail() {
    let fixture = MemoryFixture::new();
    let session = fixture.memory.session("s1");
    session
        .put_context(
            ContextKey::PrimaryLanguage,
            serde_json::Value::String("rust".into()),
            PutOptions::default(),
        )
        .await;

    let assembled = fixture
        .memory
        .recall(
            "s1",
            RecallInput {
                system_prompt: "you are a coding assistant".into(),
                conversation: vec![message("user", "what language are we using?")],
                query_hint: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(assembled.working_context.len(), 1);
    assert_eq!(assembled.working_context[0].key, ContextKey::PrimaryLanguage);
    assert_eq!(assembled.conversation.len(), 1);
}

#[tokio::test]
async fn format_context_renders_sections_in_the_documented_order() {
    let fixture = MemoryFixture::new();
    fixture
        .memory
        .remember(
            "s1",
            memory_core::RememberInput {
                memory_type: MemoryKind::ArchitecturalDecision,
                source_type: SourceKind::Agent,
                ..remember_input("we use axum for the http layer", 0.95)
            },
        )
        .await
        .unwrap();
    let session = fixture.memory.session("s1");
    session
        .put_context(
            ContextKey::Framework,
            serde_json::Value::String("axum".into()),
            PutOptions::default(),
        )
        .await;

    let assembled = fixture
        .memory
        .recall(
            "s1",
            RecallInput {
                system_prompt: "you are a coding assistant".into(),
                conversation: vec![message("user", "hello")],
                query_hint: None,
            },
        )
        .await
        .unwrap();
    let rendered = fixture.memory.format_context(&assembled);

    // format_for_prompt renders only the two sections spec §4.9 documents;
    // conversation stays on `assembled.conversation` for the caller to feed
    // the model as chat history directly.
    let system_pos = rendered.find("you are a coding assistant").unwrap();
    let context_pos = rendered.find("## Session Context").unwrap();
    let remembered_pos = rendered.find("## Remembered Information").unwrap();
    assert!(system_pos < context_pos);
    assert!(context_pos < remembered_pos);
    assert!(rendered.contains("(high confidence)"));
    assert!(!rendered.contains("## Conversation"));
    assert_eq!(assembled.conversation.len(), 1);
}

#[tokio::test]
async fn recall_never_truncates_working_context_however_tight_the_budget() {
    let fixture = MemoryFixture::with_config({
        let mut config = memory_core::config::MemoryConfig::default();
        config.budgets.working = 1;
        config
    });
    let session = fixture.memory.session("s1");
    for key in [ContextKey::PrimaryLanguage, ContextKey::Framework, ContextKey::ActiveFile] {
        session
            .put_context(key, serde_json::Value::String("some value".into()), PutOptions::default())
            .await;
    }

    let assembled = fixture
        .memory
        .recall(
            "s1",
            RecallInput {
                system_prompt: String::new(),
                conversation: vec![],
                query_hint: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(assembled.working_context.len(), 3);
    assert_eq!(assembled.truncation.working_context_dropped, 0);
}

#[tokio::test]
async fn query_hint_widens_the_fetch_and_drops_the_confidence_floor() {
    let fixture = MemoryFixture::new();
    fixture
        .memory
        .remember("s1", remember_input("a low confidence note about auth", 0.1))
        .await
        .unwrap();

    let assembled = fixture
        .memory
        .recall(
            "s1",
            RecallInput {
                system_prompt: String::new(),
                conversation: vec![],
                query_hint: Some("auth".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(assembled.memories.len(), 1);
}
