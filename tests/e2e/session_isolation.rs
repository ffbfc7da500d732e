//! Every long-term read/write is scoped to a session; one session can
//! never see, modify, or delete another's memories (spec §8, universal
//! invariant).

use memory_core::error::Error;
use memory_test_utils::{remember_input, MemoryFixture};

#[tokio::test]
async fn recall_in_one_session_never_surfaces_another_sessions_memory() {
    let fixture = MemoryFixture::new();
    fixture
        .memory
        .remember("s1", remember_input("s1 only knows this", 0.9))
        .await
        .unwrap();
    fixture
        .memory
        .remember("s2", remember_input("s2 only knows this", 0.9))
        .await
        .unwrap();

    assert_eq!(fixture.memory.count("s1", false).await.unwrap(), 1);
    assert_eq!(fixture.memory.count("s2", false).await.unwrap(), 1);
}

#[tokio::test]
async fn get_across_sessions_is_rejected_as_a_mismatch() {
    let fixture = MemoryFixture::new();
    let id = fixture
        .memory
        .remember("s1", remember_input("s1's secret", 0.9))
        .await
        .unwrap();

    let result = fixture.memory.get("s2", &id).await;
    assert!(matches!(result, Err(Error::SessionMismatch(_))));
}

#[tokio::test]
async fn forget_across_sessions_is_rejected_and_leaves_the_memory_intact() {
    let fixture = MemoryFixture::new();
    let id = fixture
        .memory
        .remember("s1", remember_input("don't touch me", 0.9))
        .await
        .unwrap();

    let result = fixture.memory.forget("s2", &id).await;
    assert!(result.is_err());
    assert_eq!(fixture.memory.count("s1", false).await.unwrap(), 1);
}

#[tokio::test]
async fn working_context_is_independent_per_session() {
    use memory_core::types::ContextKey;
    use memory_core::working_context::PutOptions;

    let fixture = MemoryFixture::new();
    let s1 = fixture.memory.session("s1");
    let s2 = fixture.memory.session("s2");
    s1.put_context(ContextKey::ActiveFile, serde_json::Value::String("a.rs".into()), PutOptions::default())
        .await;

    assert!(s1.peek_context(ContextKey::ActiveFile).await.is_some());
    assert!(s2.peek_context(ContextKey::ActiveFile).await.is_none());
}
