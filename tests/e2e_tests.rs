//! End-to-end rounds: validator components talking HTTP to real miner gateways.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cers::dispatch::{DispatchClient, DispatchTimeouts, HttpDispatchClient, MinerEndpoint, MinerRegistry};
use cers::protocol::{MinerUid, ProtocolMode, Query, QueryRequest};
use cers::query::{BenchmarkItem, BenchmarkQuerySource, FreeQuerySource};
use cers::reward::{CrossEncoderScorer, FixedRelevanceModel, MrrScorer, RewardEngine};
use cers::validator::{MovingAverageSink, RoundDriver, RoundOutcome, RoundSettings};

use common::harness::{TestMinerConfig, spawn_test_miner, unused_addr};

const PARIS: (&str, &str) = ("paris", "Paris is the capital of France.");
const BANANAS: (&str, &str) = ("bananas", "Bananas are yellow.");
const BITTENSOR: (&str, &str) = ("bittensor", "Bittensor is a decentralized AI network.");

fn settings(sample_size: usize) -> RoundSettings {
    RoundSettings {
        sample_size,
        timeouts: DispatchTimeouts::uniform(Duration::from_secs(5)),
        round_interval: Duration::from_secs(1),
    }
}

fn http_client() -> Arc<HttpDispatchClient> {
    Arc::new(HttpDispatchClient::new(Duration::from_secs(5)).expect("client should build"))
}

fn reward_of(outcome: &RoundOutcome, uid: u16) -> f32 {
    let index = outcome
        .uids
        .iter()
        .position(|u| *u == MinerUid(uid))
        .expect("uid should have been dispatched");
    outcome.rewards.as_slice()[index]
}

#[tokio::test]
async fn test_mrr_round_over_http() {
    let good = spawn_test_miner(TestMinerConfig::default().with_documents(&[PARIS, BANANAS]))
        .await
        .expect("Miner should start");
    let unrelated =
        spawn_test_miner(TestMinerConfig::default().with_documents(&[BANANAS, BITTENSOR]))
            .await
            .expect("Miner should start");
    let dead = unused_addr().await.unwrap();

    let registry = MinerRegistry::new([
        MinerEndpoint::new(0, good.url()),
        MinerEndpoint::new(1, unrelated.url()),
        MinerEndpoint::new(2, dead.to_string()),
    ]);
    let queries = Arc::new(BenchmarkQuerySource::from_items([BenchmarkItem {
        query: "capital of France".to_string(),
        relevant_docs: vec!["paris".to_string()],
    }]));
    let sink = Arc::new(MovingAverageSink::new(1.0));
    let driver = RoundDriver::new(
        queries,
        http_client(),
        Arc::new(RewardEngine::Mrr(MrrScorer::new())),
        sink.clone(),
        registry,
        settings(3),
    )
    .unwrap();

    let outcome = driver.run_round().await.expect("Round should complete");

    assert_eq!(outcome.rewards.len(), 3);
    assert_eq!(outcome.answered, 2);
    assert_eq!(reward_of(&outcome, 0), 1.0);
    assert_eq!(reward_of(&outcome, 1), 0.0);
    assert_eq!(reward_of(&outcome, 2), 0.0);
    assert_eq!(sink.score(MinerUid(0)), Some(1.0));
}

#[tokio::test]
async fn test_cross_encoder_round_over_http() {
    let good = spawn_test_miner(
        TestMinerConfig::default()
            .with_documents(&[PARIS, BANANAS])
            .serving_documents(),
    )
    .await
    .expect("Miner should start");
    let weak = spawn_test_miner(
        TestMinerConfig::default()
            .with_documents(&[BANANAS])
            .serving_documents(),
    )
    .await
    .expect("Miner should start");
    // Answers ids only, so the documents route is a 404.
    let ids_only = spawn_test_miner(TestMinerConfig::default().with_documents(&[PARIS]))
        .await
        .expect("Miner should start");

    let registry = MinerRegistry::new([
        MinerEndpoint::new(0, good.url()),
        MinerEndpoint::new(1, weak.url()),
        MinerEndpoint::new(2, ids_only.url()),
    ]);
    let model = FixedRelevanceModel::new()
        .with_score(PARIS.1, 0.9)
        .with_score(BANANAS.1, 0.1);
    let driver = RoundDriver::new(
        Arc::new(FreeQuerySource::from_queries(["What is the capital of France?"]).unwrap()),
        http_client(),
        Arc::new(RewardEngine::CrossEncoder(CrossEncoderScorer::new(Arc::new(
            model,
        )))),
        Arc::new(MovingAverageSink::new(1.0)),
        registry,
        settings(3),
    )
    .unwrap();

    let outcome = driver.run_round().await.expect("Round should complete");

    assert_eq!(outcome.answered, 2);
    assert_eq!(reward_of(&outcome, 0), 0.9);
    assert_eq!(reward_of(&outcome, 1), 0.1);
    assert_eq!(reward_of(&outcome, 2), 0.0);
}

#[tokio::test]
async fn test_ids_only_reply_carries_no_content() {
    let miner = spawn_test_miner(
        TestMinerConfig::default()
            .with_documents(&[PARIS, BANANAS, BITTENSOR])
            .serving_documents(),
    )
    .await
    .expect("Miner should start");
    let endpoint = MinerEndpoint::new(7, miner.url());
    let request = QueryRequest::new(&Query::new("capital of France").unwrap());

    let response = http_client()
        .query(&endpoint, &request, ProtocolMode::IdsOnly)
        .await
        .expect("Query should succeed");

    assert!(response.success);
    assert_eq!(response.uid, MinerUid(7));
    assert_eq!(response.document_ids.len(), 2);
    assert_eq!(response.document_ids[0], "paris");
    assert!(response.documents.is_empty());
}

#[tokio::test]
async fn test_dead_miner_is_reported_as_error() {
    let dead = unused_addr().await.unwrap();
    let endpoint = MinerEndpoint::new(3, dead.to_string());
    let request = QueryRequest::new(&Query::new("anything").unwrap());

    let result = http_client()
        .query(&endpoint, &request, ProtocolMode::IdsOnly)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_managed_document_becomes_retrievable() {
    let miner = spawn_test_miner(
        TestMinerConfig::default()
            .with_documents(&[BANANAS, BITTENSOR])
            .with_api_key("e2e-key"),
    )
    .await
    .expect("Miner should start");
    let http = reqwest::Client::new();

    let created = http
        .post(format!("{}/documents", miner.url()))
        .header("x-api-key", "e2e-key")
        .json(&serde_json::json!({"id": "paris", "document": PARIS.1}))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);

    let endpoint = MinerEndpoint::new(0, miner.url());
    let request = QueryRequest::new(&Query::new("capital of France").unwrap());
    let response = http_client()
        .query(&endpoint, &request, ProtocolMode::IdsOnly)
        .await
        .unwrap();
    assert_eq!(response.document_ids[0], "paris");

    let deleted = http
        .delete(format!("{}/documents/paris", miner.url()))
        .header("x-api-key", "e2e-key")
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), reqwest::StatusCode::OK);
    assert_eq!(miner.store.count().await.unwrap(), 2);

    miner.shutdown().await;
}
