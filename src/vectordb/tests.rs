use super::*;
use serde_json::json;

const TEST_VECTOR_SIZE: usize = 8;

fn create_test_vector(seed: u64) -> Vec<f32> {
    (0..TEST_VECTOR_SIZE as u64)
        .map(|i| {
            let mixed = (seed.wrapping_mul(31).wrapping_add(i * 7)) % 1000;
            mixed as f32 / 1000.0 + 0.01
        })
        .collect()
}

fn create_test_entry(id: &str, user_type: &str, seed: u64) -> CacheEntry {
    CacheEntry::new(
        id.to_string(),
        format!("question {}", id),
        format!("answer {}", id),
        user_type.to_string(),
    )
    .with_vector(create_test_vector(seed))
    .with_created_at(1_702_512_000)
}

#[tokio::test]
async fn test_memory_upsert_and_get() {
    let store = MemoryStore::new(TEST_VECTOR_SIZE);
    store
        .upsert(create_test_entry("a", "general", 1))
        .await
        .expect("should upsert");

    let payload = store.get_by_id("a").await.expect("should find entry");
    assert_eq!(payload["question"], "question a");
    assert_eq!(payload["answer"], "answer a");
    assert_eq!(payload["user_type"], "general");
    assert_eq!(payload["created_at"], 1_702_512_000);
    assert_eq!(payload["statistics"]["hit_count"], 0);
}

#[tokio::test]
async fn test_memory_rejects_wrong_dimension() {
    let store = MemoryStore::new(TEST_VECTOR_SIZE);
    let entry = create_test_entry("a", "general", 1).with_vector(vec![1.0; 3]);

    let err = store.upsert(entry).await.unwrap_err();
    assert!(matches!(
        err,
        VectorDbError::InvalidDimension {
            expected: TEST_VECTOR_SIZE,
            actual: 3
        }
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_memory_get_missing_is_not_found() {
    let store = MemoryStore::new(TEST_VECTOR_SIZE);
    let err = store.get_by_id("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "cache not found: missing");

    let err = store.delete_one("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_search_isolates_user_types() {
    let store = MemoryStore::new(TEST_VECTOR_SIZE);
    store.upsert(create_test_entry("a", "tenant-a", 1)).await.unwrap();
    store.upsert(create_test_entry("b", "tenant-b", 1)).await.unwrap();

    let results = store
        .search(
            &create_test_vector(1),
            10,
            0.0,
            &SearchFilter::user_type("tenant-a"),
        )
        .await
        .expect("should search");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "a");
    assert_eq!(results[0].payload_str("user_type"), Some("tenant-a"));
}

#[tokio::test]
async fn test_search_orders_descending_and_truncates() {
    let store = MemoryStore::new(TEST_VECTOR_SIZE);
    for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
        store
            .upsert(create_test_entry(id, "general", i as u64 * 13))
            .await
            .unwrap();
    }

    let results = store
        .search(&create_test_vector(0), 3, 0.0, &SearchFilter::user_type("general"))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].id, "a");
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_search_applies_threshold() {
    let store = MemoryStore::new(TEST_VECTOR_SIZE);
    let mut orthogonal = vec![0.0; TEST_VECTOR_SIZE];
    orthogonal[0] = 1.0;
    let mut other = vec![0.0; TEST_VECTOR_SIZE];
    other[1] = 1.0;

    store
        .upsert(create_test_entry("near", "general", 0).with_vector(orthogonal.clone()))
        .await
        .unwrap();
    store
        .upsert(create_test_entry("far", "general", 0).with_vector(other))
        .await
        .unwrap();

    let results = store
        .search(&orthogonal, 10, 0.5, &SearchFilter::user_type("general"))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "near");
    assert!((results[0].score - 1.0).abs() < 1e-6);
}

#[test]
fn test_payload_core_fields_win_over_metadata() {
    let mut metadata = Payload::new();
    metadata.insert("answer".to_string(), json!("spoofed"));
    metadata.insert("source".to_string(), json!("faq"));

    let payload = create_test_entry("a", "general", 1)
        .with_metadata(metadata)
        .to_payload();

    assert_eq!(payload["answer"], "answer a");
    assert_eq!(payload["source"], "faq");
}

#[test]
fn test_search_match_carries_score_in_payload() {
    let m = SearchMatch::new("x", 0.93, Payload::new());
    assert_eq!(m.payload["score"].as_f64().map(|s| s as f32), Some(0.93));
    assert_eq!(m.score, 0.93);
}

#[test]
fn test_cosine_similarity_edge_cases() {
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
}

#[test]
fn test_vector_backend_from_str() {
    assert_eq!("qdrant".parse::<VectorBackend>(), Ok(VectorBackend::Qdrant));
    assert_eq!("Redis".parse::<VectorBackend>(), Ok(VectorBackend::Redis));
    assert_eq!("memory".parse::<VectorBackend>(), Ok(VectorBackend::Memory));
    assert!("milvus".parse::<VectorBackend>().is_err());
}

#[test]
fn test_redis_key_layout() {
    assert_eq!(super::redis::entry_key("llm_cache", "abc"), "llm_cache:entry:abc");
    assert_eq!(
        super::redis::tenant_index_key("llm_cache", "support"),
        "llm_cache:user_type:support"
    );
}

#[test]
fn test_redis_entry_ids_cannot_address_tenant_index() {
    for (id, tenant) in [
        ("user_type:general", "general"),
        ("user_type:", ""),
        ("entry:user_type:general", "general"),
    ] {
        assert_ne!(
            super::redis::entry_key("llm_cache", id),
            super::redis::tenant_index_key("llm_cache", tenant)
        );
    }
    assert!(super::redis::entry_key("llm_cache", "user_type:general").starts_with("llm_cache:entry:"));
}

#[test]
fn test_redis_corrupt_entry_is_serialization_error() {
    match super::redis::decode_entry("c1", "{not json") {
        Err(VectorDbError::Serialization { id, .. }) => assert_eq!(id, "c1"),
        other => panic!("expected serialization error, got {:?}", other),
    }

    let entry = create_test_entry("c2", "general", 3);
    let json = serde_json::to_string(&entry).expect("entry should serialise");
    let decoded = super::redis::decode_entry("c2", &json).expect("stored entry should decode");
    assert_eq!(decoded.id, "c2");
    assert_eq!(decoded.user_type, "general");
}

#[test]
fn test_qdrant_point_ids() {
    let uuid = uuid::Uuid::new_v4().to_string();
    let pid = qdrant::parse_point_id(&uuid).expect("uuid should parse");
    assert_eq!(qdrant::point_id_to_string(Some(pid)), Some(uuid));

    let pid = qdrant::parse_point_id("42").expect("integer should parse");
    assert_eq!(qdrant::point_id_to_string(Some(pid)), Some("42".to_string()));

    assert!(qdrant::parse_point_id("not-an-id").is_none());
    assert_eq!(qdrant::point_id_to_string(None), None);
}

#[tokio::test]
async fn test_qdrant_store_builds_without_network() {
    let store = QdrantStore::new(QdrantConfig::default()).expect("should build client");
    assert_eq!(store.collection(), "llm_cache");
    assert_eq!(store.backend_name(), "qdrant");
    assert!(store.supports_batch_delete());
}

#[tokio::test]
async fn test_memory_backend_factory() {
    let config = VectorStoreConfig {
        backend: VectorBackend::Memory,
        ..Default::default()
    };
    let store = build_vector_store(&config).await.expect("should build");
    assert_eq!(store.backend_name(), "memory");
}

#[tokio::test]
async fn test_mock_injected_failures() {
    let store = MockVectorStore::per_key(TEST_VECTOR_SIZE);
    store.upsert(create_test_entry("a", "general", 1)).await.unwrap();
    store.upsert(create_test_entry("b", "general", 2)).await.unwrap();
    store.fail_delete_for("b");

    assert!(store.delete_one("a").await.is_ok());
    assert!(matches!(
        store.delete_one("b").await,
        Err(VectorDbError::DeleteFailed { .. })
    ));
    assert!(!store.supports_batch_delete());
    assert_eq!(store.delete_one_calls(), 2);
    assert_eq!(store.len(), 1);

    store.set_fail_search(true);
    let err = store
        .search(&create_test_vector(1), 5, 0.0, &SearchFilter::user_type("general"))
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::SearchFailed { .. }));
    assert_eq!(
        store.last_search().map(|s| s.top_k),
        Some(5),
        "call should be recorded even when it fails"
    );
}
