use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use super::*;
use crate::embedding::SentenceEncoder;
use crate::vectordb::InMemoryVectorDb;

const COLLECTION: &str = "test-docs";

async fn store(store_text: bool) -> DocumentStore<InMemoryVectorDb> {
    let encoder = Arc::new(SentenceEncoder::stub().unwrap());
    let store = DocumentStore::new(encoder, InMemoryVectorDb::new(), COLLECTION, store_text);
    store.ensure_collection().await.unwrap();
    store
}

async fn seeded_store(store_text: bool) -> DocumentStore<InMemoryVectorDb> {
    let store = store(store_text).await;
    store
        .upsert_batch(vec![
            Document::new("paris", "Paris is the capital of France."),
            Document::new("bananas", "Bananas are yellow."),
            Document::new("bittensor", "Bittensor is a decentralized machine learning network."),
        ])
        .await
        .unwrap();
    store
}

fn seed_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[tokio::test]
async fn test_search_ranks_relevant_document_first() {
    let store = seeded_store(false).await;

    let hits = store.search("capital of France", 2).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "paris");
    assert!(hits[0].score >= hits[1].score);
}

#[tokio::test]
async fn test_search_clamps_k_to_index_size() {
    let store = seeded_store(false).await;

    let hits = store.search("anything at all", 50).await.unwrap();

    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_search_empty_index_returns_nothing() {
    let store = store(false).await;

    let hits = store.search("capital of France", 5).await.unwrap();

    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_search_zero_k_returns_nothing() {
    let store = seeded_store(false).await;

    assert!(store.search("capital of France", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_text_kept_only_when_serving_documents() {
    let hidden = seeded_store(false).await;
    let served = seeded_store(true).await;

    let hidden_hits = hidden.search("capital of France", 1).await.unwrap();
    let served_hits = served.search("capital of France", 1).await.unwrap();

    assert!(hidden_hits[0].text.is_none());
    assert_eq!(
        served_hits[0].text.as_deref(),
        Some("Paris is the capital of France.")
    );
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let store = store(true).await;

    let first = store
        .upsert(Document::new("doc1", "Old text about rivers."))
        .await
        .unwrap();
    let second = store
        .upsert(Document::new("doc1", "New text about mountains."))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.count().await.unwrap(), 1);
    let hits = store.search("mountains", 1).await.unwrap();
    assert_eq!(hits[0].text.as_deref(), Some("New text about mountains."));
}

#[tokio::test]
async fn test_upsert_rejects_blank_fields() {
    let store = store(false).await;

    let result = store.upsert(Document::new("  ", "text")).await;
    assert!(matches!(result, Err(MinerError::InvalidDocument { .. })));

    let result = store.upsert(Document::new("doc1", "")).await;
    assert!(matches!(result, Err(MinerError::InvalidDocument { .. })));

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_removes_document() {
    let store = seeded_store(false).await;

    store.delete("paris").await.unwrap();

    assert_eq!(store.count().await.unwrap(), 2);
    let hits = store.search("capital of France", 3).await.unwrap();
    assert!(hits.iter().all(|h| h.id != "paris"));
}

#[tokio::test]
async fn test_delete_unknown_is_noop() {
    let store = seeded_store(false).await;

    store.delete("never-indexed").await.unwrap();

    assert_eq!(store.count().await.unwrap(), 3);
}

#[test]
fn test_read_seed_file_skips_bad_lines() {
    let file = seed_file(&[
        r#"{"id": "d1", "document": "First document."}"#,
        "",
        "not json",
        r#"{"id": "d2", "document": "Second document."}"#,
        r#"{"id": "", "document": "No id."}"#,
    ]);

    let (documents, skipped) = read_seed_file(file.path()).unwrap();

    assert_eq!(
        documents,
        vec![
            Document::new("d1", "First document."),
            Document::new("d2", "Second document."),
        ]
    );
    assert_eq!(skipped, 2);
}

#[tokio::test]
async fn test_seed_loads_in_batches() {
    let store = store(false).await;
    let file = seed_file(&[
        r#"{"id": "d1", "document": "Alpha."}"#,
        r#"{"id": "d2", "document": "Beta."}"#,
        r#"{"id": "d3", "document": "Gamma."}"#,
        "{broken",
    ]);

    let outcome = seed_from_file(&store, file.path(), 2).await.unwrap();

    assert_eq!(
        outcome,
        SeedOutcome::Loaded {
            documents: 3,
            skipped_lines: 1
        }
    );
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_seed_skips_populated_collection() {
    let store = seeded_store(false).await;
    let file = seed_file(&[r#"{"id": "d9", "document": "Never loaded."}"#]);

    let outcome = seed_from_file(&store, file.path(), 10).await.unwrap();

    assert_eq!(outcome, SeedOutcome::AlreadySeeded { existing: 3 });
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_seed_missing_file_starts_empty() {
    let store = store(false).await;

    let outcome = seed_from_file(&store, std::path::Path::new("/nonexistent/docs.jsonl"), 10)
        .await
        .unwrap();

    assert_eq!(outcome, SeedOutcome::MissingFile);
    assert_eq!(store.count().await.unwrap(), 0);
}
