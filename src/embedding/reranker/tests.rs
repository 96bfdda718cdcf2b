use super::*;
use std::path::PathBuf;

#[test]
fn test_config_default() {
    let config = RerankerConfig::default();

    assert!(config.model_path.is_none());
    assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(config.max_seq_len, MAX_SEQ_LEN);
}

#[test]
fn test_config_new() {
    let config = RerankerConfig::new("/models/ms-marco-MiniLM-L-6-v2");

    assert_eq!(
        config.model_path,
        Some(PathBuf::from("/models/ms-marco-MiniLM-L-6-v2"))
    );
}

#[test]
#[should_panic(expected = "batch_size must be at least 1")]
fn test_config_zero_batch_size_panics() {
    let _ = RerankerConfig::default().with_batch_size(0);
}

#[test]
fn test_config_validate() {
    assert!(RerankerConfig::default().validate().is_ok());

    let empty_path = RerankerConfig {
        model_path: Some(PathBuf::new()),
        ..Default::default()
    };
    assert!(empty_path.validate().is_err());

    let zero_batch = RerankerConfig {
        batch_size: 0,
        ..Default::default()
    };
    assert!(zero_batch.validate().is_err());
}

#[test]
fn test_stub_creation() {
    let reranker = Reranker::stub().unwrap();

    assert!(!reranker.is_model_loaded());
}

#[test]
fn test_load_with_missing_model() {
    let result = Reranker::load(RerankerConfig::new("/nonexistent/path/cross-encoder"));

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ModelError::ModelNotFound {
            model: ModelKind::Reranker,
            ..
        }
    ));
    assert!(err.to_string().starts_with("reranker model not found at"));
}

#[test]
fn test_load_rejects_invalid_config() {
    let config = RerankerConfig {
        batch_size: 0,
        ..RerankerConfig::stub()
    };

    let err = Reranker::load(config).unwrap_err();

    assert_eq!(err.model(), Some(ModelKind::Reranker));
    assert_eq!(
        err.to_string(),
        "invalid reranker configuration: batch_size must be at least 1"
    );
}

#[test]
fn test_load_with_incomplete_model_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();

    let result = Reranker::load(RerankerConfig::new(dir.path()));

    assert!(matches!(
        result.unwrap_err(),
        ModelError::LoadFailed {
            model: ModelKind::Reranker,
            ..
        }
    ));
}

#[test]
fn test_stub_batch_preserves_order_and_length() {
    let reranker = Reranker::stub().unwrap();

    let scores = reranker
        .score_batch(
            "capital of France",
            &["Bananas are yellow.", "Paris is the capital of France."],
        )
        .unwrap();

    assert_eq!(scores.len(), 2);
    assert!(scores[1] > scores[0]);
}

#[test]
fn test_stub_batch_empty() {
    let reranker = Reranker::stub().unwrap();

    assert!(reranker.score_batch("anything", &[]).unwrap().is_empty());
}

#[test]
fn test_stub_single_score_matches_batch() {
    let reranker = Reranker::stub().unwrap();
    let doc = "Bittensor is a decentralized network for machine learning.";

    let single = reranker.score("What is Bittensor?", doc).unwrap();
    let batch = reranker.score_batch("What is Bittensor?", &[doc]).unwrap();

    assert_eq!(single, batch[0]);
}
