//! Soft-delete/supersession: nothing is ever hard-deleted, supersede is
//! idempotent, and superseded memories are excluded by default but
//! recoverable on request (spec §8).

use memory_core::triple_store::QueryOptions;
use memory_test_utils::{remember_input, MemoryFixture};

#[tokio::test]
async fn forget_hides_from_default_queries_but_keeps_the_record() {
    let fixture = MemoryFixture::new();
    let id = fixture
        .memory
        .remember("s1", remember_input("ephemeral detail", 0.8))
        .await
        .unwrap();

    fixture.memory.forget("s1", &id).await.unwrap();

    assert_eq!(fixture.memory.count("s1", false).await.unwrap(), 0);
    assert_eq!(fixture.memory.count("s1", true).await.unwrap(), 1);
    let memory = fixture.memory.get("s1", &id).await.unwrap();
    assert!(memory.superseded_by.is_some());
}

#[tokio::test]
async fn supersede_points_at_its_replacement() {
    let fixture = MemoryFixture::new();
    let old_id = fixture
        .memory
        .remember("s1", remember_input("we use postgres", 0.7))
        .await
        .unwrap();
    let new_id = fixture
        .memory
        .remember("s1", remember_input("we use postgres 16", 0.9))
        .await
        .unwrap();

    fixture.memory.supersede("s1", &old_id, &new_id).await.unwrap();

    let old = fixture.memory.get("s1", &old_id).await.unwrap();
    assert_eq!(old.superseded_by.as_deref(), Some(new_id.as_str()));
    assert_eq!(fixture.memory.count("s1", false).await.unwrap(), 1);
}

#[tokio::test]
async fn supersede_is_idempotent() {
    let fixture = MemoryFixture::new();
    let old_id = fixture
        .memory
        .remember("s1", remember_input("we use postgres", 0.7))
        .await
        .unwrap();
    let new_id = fixture
        .memory
        .remember("s1", remember_input("we use postgres 16", 0.9))
        .await
        .unwrap();

    fixture.memory.supersede("s1", &old_id, &new_id).await.unwrap();
    // Calling it again with a different replacement must not overwrite
    // the first supersession.
    let other_id = fixture
        .memory
        .remember("s1", remember_input("we use mysql", 0.4))
        .await
        .unwrap();
    fixture.memory.supersede("s1", &old_id, &other_id).await.unwrap();

    let old = fixture.memory.get("s1", &old_id).await.unwrap();
    assert_eq!(old.superseded_by.as_deref(), Some(new_id.as_str()));
}

#[tokio::test]
async fn include_superseded_surfaces_hidden_memories_on_request() {
    let fixture = MemoryFixture::new();
    let store = fixture.memory.store_manager().get_or_create("s1").await.unwrap();
    let adapter = memory_core::triple_store::TripleStoreAdapter::new();
    let id = fixture
        .memory
        .remember("s1", remember_input("old assumption", 0.6))
        .await
        .unwrap();
    fixture.memory.forget("s1", &id).await.unwrap();

    let visible = adapter
        .query_all(&store, "s1", QueryOptions::default())
        .unwrap();
    assert!(visible.is_empty());

    let all = adapter
        .query_all(
            &store,
            "s1",
            QueryOptions {
                include_superseded: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(all.len(), 1);
}
