use super::*;
use crate::vectordb::cosine_similarity;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_for(server: &MockServer) -> RemoteEmbedder {
    let config = RemoteEmbedderConfig::new(&format!("{}/v1", server.uri()))
        .model("test-embed")
        .dimension(3)
        .api_key(Some("sk-test".to_string()));
    RemoteEmbedder::new(config).expect("should build embedder")
}

#[test]
fn test_l2_normalize() {
    let mut v = vec![3.0, 4.0];
    l2_normalize(&mut v);
    assert!((v[0] - 0.6).abs() < 1e-6);
    assert!((v[1] - 0.8).abs() < 1e-6);

    let mut zero = vec![0.0, 0.0];
    l2_normalize(&mut zero);
    assert_eq!(zero, vec![0.0, 0.0]);
}

#[test]
fn test_remote_config_requires_base_url() {
    let err = RemoteEmbedder::new(RemoteEmbedderConfig::default()).unwrap_err();
    assert!(matches!(err, EmbeddingError::NotConfigured { .. }));

    let err = RemoteEmbedderConfig::new("http://x").dimension(0).validate();
    assert!(matches!(err, Err(EmbeddingError::InvalidConfig { .. })));
}

#[test]
fn test_remote_endpoint_joins_path() {
    let embedder =
        RemoteEmbedder::new(RemoteEmbedderConfig::new("http://localhost:9000/v1/")).unwrap();
    assert_eq!(embedder.endpoint(), "http://localhost:9000/v1/embeddings");
}

#[tokio::test]
async fn test_remote_embed_batch_orders_by_index_and_normalizes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({ "model": "test-embed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.0, 2.0, 0.0] },
                { "index": 0, "embedding": [3.0, 0.0, 4.0] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = remote_for(&server);
    let vectors = embedder
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .expect("should embed");

    assert_eq!(vectors.len(), 2);
    assert!((vectors[0][0] - 0.6).abs() < 1e-6);
    assert!((vectors[0][2] - 0.8).abs() < 1e-6);
    assert_eq!(vectors[1], vec![0.0, 1.0, 0.0]);
}

#[tokio::test]
async fn test_remote_embed_single() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "index": 0, "embedding": [1.0, 0.0, 0.0] }]
        })))
        .mount(&server)
        .await;

    let vector = remote_for(&server).embed("hello").await.expect("should embed");
    assert_eq!(vector, vec![1.0, 0.0, 0.0]);
}

#[tokio::test]
async fn test_remote_http_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = remote_for(&server).embed("hello").await.unwrap_err();
    match err {
        EmbeddingError::HttpStatus { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_remote_count_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": []
        })))
        .mount(&server)
        .await;

    let err = remote_for(&server).embed("hello").await.unwrap_err();
    assert!(matches!(
        err,
        EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0
        }
    ));
}

#[tokio::test]
async fn test_remote_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = remote_for(&server).embed("hello").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_remote_empty_batch_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let vectors = remote_for(&server).embed_batch(&[]).await.expect("no-op");
    assert!(vectors.is_empty());
}

#[tokio::test]
async fn test_mock_embedder_is_deterministic() {
    let embedder = MockEmbedder::new(32);
    let a = embedder.embed("What is the capital of France?").await.unwrap();
    let b = embedder.embed("What is the capital of France?").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 32);
    assert_eq!(embedder.call_count(), 2);
}

#[tokio::test]
async fn test_mock_embedder_similarity_tracks_shared_words() {
    let embedder = MockEmbedder::new(256);
    let base = embedder.vector_for("what is the capital of france");
    let close = embedder.vector_for("what's the capital of france");
    let far = embedder.vector_for("recipe for banana bread");

    assert!(cosine_similarity(&base, &close) > cosine_similarity(&base, &far));
}

#[tokio::test]
async fn test_mock_embedder_failure() {
    let embedder = MockEmbedder::default();
    embedder.set_failing(true);
    let err = embedder.embed("anything").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InferenceFailed { .. }));
}
