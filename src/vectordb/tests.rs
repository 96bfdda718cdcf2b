use std::collections::HashMap;

use qdrant_client::qdrant::{PointId, ScoredPoint, Value};

use super::VectorIndex;
use super::error::IndexError;
use super::memory::{InMemoryVectorDb, cosine_similarity};
use super::model::{SearchResult, VectorPoint};

const TEST_COLLECTION: &str = "test_collection";
const TEST_VECTOR_SIZE: usize = 8;

fn axis(i: usize) -> Vec<f32> {
    let mut v = vec![0.0; TEST_VECTOR_SIZE as usize];
    v[i] = 1.0;
    v
}

fn create_test_point(id: u64, vector: Vec<f32>) -> VectorPoint {
    VectorPoint::new(id, vector, format!("doc{id}")).with_indexed_at(1702512000 + id as i64)
}

async fn seeded_client(points: Vec<VectorPoint>) -> InMemoryVectorDb {
    let client = InMemoryVectorDb::new();
    client
        .ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();
    client
        .upsert(TEST_COLLECTION, points)
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn test_ensure_collection_idempotent() {
    let client = InMemoryVectorDb::new();

    client
        .ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();
    client
        .upsert(TEST_COLLECTION, vec![create_test_point(1, axis(0))])
        .await
        .unwrap();
    client
        .ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();

    assert_eq!(client.point_count(TEST_COLLECTION), Some(1));
}

#[tokio::test]
async fn test_upsert_replaces_existing() {
    let client = seeded_client(vec![create_test_point(1, axis(0))]).await;

    client
        .upsert(
            TEST_COLLECTION,
            vec![create_test_point(1, axis(1)).with_document("updated")],
        )
        .await
        .unwrap();

    assert_eq!(client.count(TEST_COLLECTION).await.unwrap(), 1);
    let results = client.nearest(TEST_COLLECTION, axis(1), 1).await.unwrap();
    assert_eq!(results[0].document.as_deref(), Some("updated"));
    assert!((results[0].score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_upsert_to_nonexistent_collection() {
    let client = InMemoryVectorDb::new();

    let result = client
        .upsert("missing", vec![create_test_point(1, axis(0))])
        .await;

    assert!(matches!(
        result,
        Err(IndexError::CollectionNotFound { .. })
    ));
}

#[tokio::test]
async fn test_upsert_wrong_dimension_rejects_whole_batch() {
    let client = seeded_client(vec![]).await;

    let result = client
        .upsert(
            TEST_COLLECTION,
            vec![create_test_point(1, axis(0)), create_test_point(2, vec![1.0; 3])],
        )
        .await;

    assert!(matches!(
        result,
        Err(IndexError::InvalidDimension {
            expected: 8,
            actual: 3
        })
    ));
    assert_eq!(client.point_count(TEST_COLLECTION), Some(0));
}

#[tokio::test]
async fn test_nearest_sorted_by_score() {
    let mut close = axis(0);
    close[1] = 0.2;
    let client = seeded_client(vec![
        create_test_point(1, axis(1)),
        create_test_point(2, axis(0)),
        create_test_point(3, close),
    ])
    .await;

    let results = client.nearest(TEST_COLLECTION, axis(0), 3).await.unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["doc2", "doc3", "doc1"]);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_nearest_respects_limit() {
    let points = (0..6).map(|i| create_test_point(i, axis(i as usize))).collect();
    let client = seeded_client(points).await;

    let results = client.nearest(TEST_COLLECTION, axis(0), 2).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].doc_id, "doc0");
}

#[tokio::test]
async fn test_nearest_limit_larger_than_collection() {
    let client = seeded_client(vec![create_test_point(1, axis(0))]).await;

    let results = client.nearest(TEST_COLLECTION, axis(0), 50).await.unwrap();

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_nearest_empty_collection() {
    let client = seeded_client(vec![]).await;

    let results = client.nearest(TEST_COLLECTION, axis(0), 5).await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_nearest_nonexistent_collection() {
    let client = InMemoryVectorDb::new();

    let result = client.nearest("missing", axis(0), 5).await;

    assert!(matches!(
        result,
        Err(IndexError::CollectionNotFound { .. })
    ));
}

#[tokio::test]
async fn test_nearest_result_carries_payload() {
    let client = seeded_client(vec![
        create_test_point(7, axis(2)).with_document("Paris is the capital of France."),
    ])
    .await;

    let results = client.nearest(TEST_COLLECTION, axis(2), 1).await.unwrap();

    assert_eq!(results[0].id, 7);
    assert_eq!(results[0].doc_id, "doc7");
    assert_eq!(
        results[0].document.as_deref(),
        Some("Paris is the capital of France.")
    );
    assert_eq!(results[0].indexed_at, 1702512007);
}

#[tokio::test]
async fn test_remove_points() {
    let client = seeded_client(vec![
        create_test_point(1, axis(0)),
        create_test_point(2, axis(1)),
    ])
    .await;

    client.remove(TEST_COLLECTION, vec![1]).await.unwrap();

    assert_eq!(client.count(TEST_COLLECTION).await.unwrap(), 1);
    let results = client.nearest(TEST_COLLECTION, axis(0), 5).await.unwrap();
    assert!(results.iter().all(|r| r.doc_id != "doc1"));
}

#[tokio::test]
async fn test_remove_unknown_ids_is_noop() {
    let client = seeded_client(vec![create_test_point(1, axis(0))]).await;

    client
        .remove(TEST_COLLECTION, vec![99, 100])
        .await
        .unwrap();

    assert_eq!(client.point_count(TEST_COLLECTION), Some(1));
}

#[tokio::test]
async fn test_count_nonexistent_collection() {
    let client = InMemoryVectorDb::new();

    assert!(matches!(
        client.count("missing").await,
        Err(IndexError::CollectionNotFound { .. })
    ));
}

#[test]
fn test_cosine_similarity() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
}

#[test]
fn test_vector_point_builder() {
    let point = VectorPoint::new(3, axis(0), "doc3")
        .with_document("text")
        .with_indexed_at(42);

    assert_eq!(point.doc_id, "doc3");
    assert_eq!(point.document.as_deref(), Some("text"));
    assert_eq!(point.indexed_at, 42);
}

#[tokio::test]
async fn test_nearest_with_zero_k_is_empty() {
    let client = seeded_client(vec![create_test_point(1, axis(0))]).await;

    let results = client.nearest(TEST_COLLECTION, axis(0), 0).await.unwrap();

    assert!(results.is_empty());
}

fn scored(id: PointId, payload: HashMap<String, Value>) -> ScoredPoint {
    ScoredPoint {
        id: Some(id),
        payload,
        score: 0.75,
        ..Default::default()
    }
}

#[test]
fn test_point_payload_maps_back_to_search_result() {
    let stored = VectorPoint::new(11, axis(0), "doc11")
        .with_document("Rivers flow to the sea.")
        .with_indexed_at(1702512011)
        .into_point_struct();
    assert!(stored.payload.contains_key("doc_id"));
    let id = stored.id.clone().unwrap();

    let result = SearchResult::from_scored_point(scored(id, stored.payload)).unwrap();

    assert_eq!(
        result,
        SearchResult {
            id: 11,
            score: 0.75,
            doc_id: "doc11".to_string(),
            document: Some("Rivers flow to the sea.".to_string()),
            indexed_at: 1702512011,
        }
    );
}

#[test]
fn test_point_without_text_has_no_document() {
    let stored = VectorPoint::new(4, axis(1), "doc4").into_point_struct();
    assert!(!stored.payload.contains_key("document"));

    let result =
        SearchResult::from_scored_point(scored(PointId::from(4u64), stored.payload)).unwrap();

    assert_eq!(result.doc_id, "doc4");
    assert_eq!(result.document, None);
    assert_eq!(result.indexed_at, 0);
}

#[test]
fn test_scored_point_without_doc_id_is_skipped() {
    let mut payload = HashMap::new();
    payload.insert("document".to_string(), Value::from("orphan text"));

    assert!(SearchResult::from_scored_point(scored(PointId::from(5u64), payload)).is_none());
}

#[test]
fn test_scored_point_with_uuid_id_is_skipped() {
    let mut payload = HashMap::new();
    payload.insert("doc_id".to_string(), Value::from("doc5"));
    let id = PointId::from("6a1f3c1e-3c1d-4a7e-9c4b-1f0e2d3c4b5a".to_string());

    assert!(SearchResult::from_scored_point(scored(id, payload)).is_none());
}

#[test]
fn test_error_messages() {
    let err = IndexError::InvalidDimension {
        expected: 384,
        actual: 3,
    };
    assert_eq!(
        err.to_string(),
        "invalid vector dimension: expected 384, got 3"
    );

    let err = IndexError::Backend {
        op: "search",
        collection: "documents".to_string(),
        message: "timeout".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "search failed on collection 'documents': timeout"
    );
}
